//! Field Arithmetic
//!
//! Two prime fields are in play and they are never interchangeable:
//!
//! ```text
//! Fr  (BN254 scalar field)  commitments, nullifiers, curve coordinates, Poseidon
//! Fq  (BN254 base field)    Groth16 proof coordinates only
//! ```
//!
//! Both serialize as 32-byte big-endian integers. The helpers here are generic
//! over the field, so the modulus is picked by the type at the call site.

pub use ark_bn254::{Fq, Fr};
use ark_ff::{BigInteger, Field, PrimeField};

use crate::error::{PrivacyError, PrivacyResult};

/// Interpret 32 big-endian bytes as an integer and reduce it into `F`.
pub fn bytes_to_field<F: PrimeField>(bytes: &[u8; 32]) -> F {
    F::from_be_bytes_mod_order(bytes)
}

/// Serialize a field element as 32 big-endian bytes, zero-padded.
pub fn field_to_bytes<F: PrimeField>(value: &F) -> [u8; 32] {
    let bytes = value.into_bigint().to_bytes_be();
    let tail = &bytes[bytes.len().saturating_sub(32)..];
    let mut arr = [0u8; 32];
    arr[32 - tail.len()..].copy_from_slice(tail);
    arr
}

/// True when `bytes` encodes an integer strictly below the modulus of `F`.
pub fn is_canonical<F: PrimeField>(bytes: &[u8; 32]) -> bool {
    let modulus = F::MODULUS.to_bytes_be();
    let modulus = &modulus[modulus.len().saturating_sub(32)..];
    bytes.as_slice() < modulus
}

/// Parse a field element, rejecting encodings that would need reduction.
pub fn field_from_canonical_bytes<F: PrimeField>(bytes: &[u8; 32]) -> Option<F> {
    is_canonical::<F>(bytes).then(|| bytes_to_field(bytes))
}

/// Multiplicative inverse.
///
/// arkworks computes this with the binary extended Euclidean algorithm. Zero
/// is the only element without an inverse in a prime field.
pub fn mod_inverse<F: Field>(value: &F) -> PrivacyResult<F> {
    value.inverse().ok_or(PrivacyError::ModularInverseUndefined)
}

/// Encode a `u64` as a canonical 32-byte big-endian field element.
pub fn u64_to_bytes32_be(value: u64) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[24..].copy_from_slice(&value.to_be_bytes());
    bytes
}
