//! Nullifiers
//!
//! ```text
//! nk               = H_nk(seed, 0)
//! spend nullifier  = H_spend(nk, commitment, leaf_index)
//! action nullifier = H_action(nk, commitment, action_tag)
//! ```
//!
//! Binding the leaf index means a note can only be nullified at the position
//! it was stored at, and two notes with equal commitments at different
//! positions still get distinct nullifiers. Action nullifiers mark one-time
//! non-spend actions (votes, claims) on a note without revealing which note.
//!
//! Tracking which nullifiers were revealed is the caller's job.

use serde::{Deserialize, Serialize};

use crate::commitment::Commitment;
use crate::field::{Fr, bytes_to_field, field_to_bytes};
use crate::hash::{Domain, PoseidonHasher};

/// A nullifier (32 bytes) - unique tag for a spent note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nullifier(pub [u8; 32]);

impl Nullifier {
    /// Create from field element
    pub fn from_field(f: Fr) -> Self {
        Self(field_to_bytes(&f))
    }

    /// Convert to field element
    pub fn to_field(&self) -> Fr {
        bytes_to_field(&self.0)
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Nullifier {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Nullifier derivation key
///
/// Knowledge of this key is required to derive valid nullifiers. It is
/// derived once from the spending seed and cached by the keypair.
#[derive(Clone, PartialEq, Eq)]
pub struct NullifierKey(Fr);

impl NullifierKey {
    /// `nk = H_nk(seed mod r, 0)`
    pub fn derive(hasher: &PoseidonHasher, seed: &[u8; 32]) -> Self {
        let seed = bytes_to_field::<Fr>(seed);
        Self(hasher.hash_with(Domain::NullifierKey, &[seed, Fr::from(0u64)]))
    }

    pub fn from_field(nk: Fr) -> Self {
        Self(nk)
    }

    pub fn to_field(&self) -> Fr {
        self.0
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        field_to_bytes(&self.0)
    }

    /// Nullifier revealed when spending the note at `leaf_index`
    pub fn spend_nullifier(
        &self,
        hasher: &PoseidonHasher,
        commitment: &Commitment,
        leaf_index: u64,
    ) -> Nullifier {
        Nullifier::from_field(hasher.hash_with(
            Domain::SpendNullifier,
            &[self.0, commitment.to_field(), Fr::from(leaf_index)],
        ))
    }

    /// Nullifier for a one-time action tagged `action_tag` on a note
    pub fn action_nullifier(
        &self,
        hasher: &PoseidonHasher,
        commitment: &Commitment,
        action_tag: &Fr,
    ) -> Nullifier {
        Nullifier::from_field(hasher.hash_with(
            Domain::ActionNullifier,
            &[self.0, commitment.to_field(), *action_tag],
        ))
    }
}

impl std::fmt::Debug for NullifierKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NullifierKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (PoseidonHasher, NullifierKey) {
        let hasher = PoseidonHasher::new();
        let nk = NullifierKey::derive(&hasher, &[1u8; 32]);
        (hasher, nk)
    }

    #[test]
    fn test_nullifier_key_derivation() {
        let hasher = PoseidonHasher::new();
        let nk = NullifierKey::derive(&hasher, &[7u8; 32]);

        let expected = hasher.hash(
            &[
                Domain::NullifierKey.to_field(),
                bytes_to_field(&[7u8; 32]),
                Fr::from(0u64),
            ],
            None,
        );
        assert_eq!(nk.to_field(), expected);
        assert_eq!(nk, NullifierKey::derive(&hasher, &[7u8; 32]));
    }

    #[test]
    fn test_nullifier_deterministic() {
        let (hasher, nk) = setup();
        let commitment = Commitment([2u8; 32]);

        let n1 = nk.spend_nullifier(&hasher, &commitment, 100);
        let n2 = nk.spend_nullifier(&hasher, &commitment, 100);

        assert_eq!(n1, n2, "same inputs should produce same nullifier");
    }

    #[test]
    fn test_nullifier_unique_per_note() {
        let (hasher, nk) = setup();

        let n1 = nk.spend_nullifier(&hasher, &Commitment([1u8; 32]), 0);
        let n2 = nk.spend_nullifier(&hasher, &Commitment([2u8; 32]), 0);

        assert_ne!(n1, n2, "different notes should have different nullifiers");
    }

    #[test]
    fn test_nullifier_requires_key() {
        let hasher = PoseidonHasher::new();
        let key1 = NullifierKey::derive(&hasher, &[1u8; 32]);
        let key2 = NullifierKey::derive(&hasher, &[2u8; 32]);
        let commitment = Commitment([3u8; 32]);

        assert_ne!(
            key1.spend_nullifier(&hasher, &commitment, 0),
            key2.spend_nullifier(&hasher, &commitment, 0),
            "different keys should produce different nullifiers"
        );
    }

    #[test]
    fn test_position_affects_nullifier() {
        let (hasher, nk) = setup();
        let commitment = Commitment([2u8; 32]);

        assert_ne!(
            nk.spend_nullifier(&hasher, &commitment, 0),
            nk.spend_nullifier(&hasher, &commitment, 1),
            "different positions should produce different nullifiers"
        );
    }

    #[test]
    fn test_action_nullifier_separated_from_spend() {
        let (hasher, nk) = setup();
        let commitment = Commitment([4u8; 32]);

        let spend = nk.spend_nullifier(&hasher, &commitment, 5);
        let action = nk.action_nullifier(&hasher, &commitment, &Fr::from(5u64));
        assert_ne!(spend, action, "domains keep the two nullifier kinds apart");

        let other_action = nk.action_nullifier(&hasher, &commitment, &Fr::from(6u64));
        assert_ne!(action, other_action);
    }

    #[test]
    fn test_debug_redacts_key() {
        let (_, nk) = setup();
        assert_eq!(format!("{:?}", nk), "NullifierKey(..)");
    }
}
