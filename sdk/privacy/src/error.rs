//! Error types for the privacy primitives

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrivacyError {
    #[error("invalid key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("scalar is not below the subgroup order")]
    ScalarOutOfRange,

    #[error("poseidon hasher used before initialization")]
    HashNotInitialized,

    #[error("note authentication tag mismatch")]
    AuthenticationFailure,

    #[error("proof must be exactly 256 bytes, got {0}")]
    ProofLengthMismatch(usize),

    #[error("modular inverse undefined")]
    ModularInverseUndefined,

    #[error("point is not on the curve or not in the prime-order subgroup")]
    InvalidPoint,

    #[error("malformed encrypted note")]
    MalformedCiphertext,

    #[error("unknown note type discriminator: {0}")]
    UnknownNoteType(u8),

    #[error("note plaintext has {got} bytes, expected {expected}")]
    NoteLengthMismatch { got: usize, expected: usize },

    #[error("invalid proof element: {0}")]
    InvalidProofElement(&'static str),
}

pub type PrivacyResult<T> = Result<T, PrivacyError>;
