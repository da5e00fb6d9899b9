//! Shade Privacy SDK
//!
//! Note-based privacy primitives for shielded transfers, positions and
//! liquidity.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Shielded Transaction                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌───────────────────────┐  │
//! │  │  Nullifiers  │  │ Commitments  │  │   Encrypted Notes     │  │
//! │  │  (spent)     │  │  (new notes) │  │   (for recipient)     │  │
//! │  └──────────────┘  └──────────────┘  └───────────────────────┘  │
//! │         │                 │                     │               │
//! │     nk, leaf         stealth key           ECDH + SHA-256       │
//! │         ▼                 ▼                     ▼               │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │        Poseidon (BN254 Fr)  ·  BabyJubJub (over Fr)     │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │                           │                                     │
//! │                           ▼                                     │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │        Groth16 proof, 256-byte encoding (BN254 Fq)       │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every hash-dependent call takes a [`PoseidonHasher`] by reference. Build one
//! with [`PoseidonHasher::new`], or share the process-wide instance from
//! [`PoseidonHasher::init`].

pub mod commitment;
pub mod curve;
pub mod encryption;
pub mod error;
pub mod field;
pub mod hash;
pub mod keys;
pub mod merkle;
pub mod note;
pub mod nullifier;
pub mod proof;
pub mod stealth;

pub use commitment::{Commitment, compute_commitment, verify_commitment};
pub use curve::{
    CurvePoint, GENERATOR, IDENTITY, Scalar, derive_public_key, random_scalar, scalar_from_bytes,
    scalar_from_field, scalar_to_bytes,
};
pub use encryption::{
    EncryptedNote, decrypt_note, encrypt_note, encrypt_notes, scan_notes, try_decrypt_note,
    try_decrypt_note_bytes,
};
pub use error::{PrivacyError, PrivacyResult};
pub use field::{Fq, Fr, bytes_to_field, field_to_bytes, mod_inverse};
pub use hash::{Domain, HashConfig, PoseidonHasher};
pub use keys::{SpendingKeypair, ViewingKey};
pub use merkle::{MerkleHasher, MerklePath, TREE_DEPTH};
pub use note::{Identifier, IdentifierKind, Note, NoteKind, NoteType};
pub use nullifier::{Nullifier, NullifierKey};
pub use proof::{
    Groth16Proof, ProofBytes, SnarkjsProof, format_proof, parse_proof, serialize_proof,
};
pub use stealth::{
    EphemeralSecret, StealthAddress, check_stealth_ownership, derive_stealth_private_key,
    generate_stealth_address,
};
