//! Wallet Keys
//!
//! ```text
//! seed (32 bytes, secret)
//!   ├── y  = seed mod l             spending scalar
//!   ├── Y  = y·G                    long-term public key
//!   ├── vk = y                      viewing key: detects and decrypts notes,
//!   │                               derives stealth keys, no nullifiers
//!   └── nk = H_nk(seed, 0)          nullifier key (cached)
//! ```
//!
//! Seeds come from fresh entropy, raw bytes, a wallet signature, or a seed
//! phrase. Signature and phrase inputs are stretched with BLAKE3 in
//! derive-key mode.

use ark_ff::PrimeField;
use rand::{CryptoRng, RngCore};

use crate::curve::{CurvePoint, Scalar, derive_public_key};
use crate::error::{PrivacyError, PrivacyResult};
use crate::hash::PoseidonHasher;
use crate::nullifier::NullifierKey;

const SIGNATURE_CONTEXT: &str = "shade-privacy 2024 spending key from signature v1";
const PHRASE_CONTEXT: &str = "shade-privacy 2024 spending key from phrase v1";

/// Spending keypair - allows spending notes
///
/// This is the most sensitive key. Loss = loss of funds.
/// Compromise = theft of funds.
#[derive(Clone)]
pub struct SpendingKeypair {
    seed: [u8; 32],
    secret: Scalar,
    public_key: CurvePoint,
    nullifier_key: NullifierKey,
}

impl SpendingKeypair {
    /// Generate from fresh entropy
    pub fn random<R: RngCore + CryptoRng>(hasher: &PoseidonHasher, rng: &mut R) -> Self {
        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        Self::from_seed(hasher, seed)
    }

    /// Restore from a 32-byte seed
    pub fn from_seed(hasher: &PoseidonHasher, seed: [u8; 32]) -> Self {
        let secret = Scalar::from_be_bytes_mod_order(&seed);
        Self {
            seed,
            secret,
            public_key: derive_public_key(&secret),
            nullifier_key: NullifierKey::derive(hasher, &seed),
        }
    }

    /// Restore from a byte slice that must be exactly 32 bytes
    pub fn from_slice(hasher: &PoseidonHasher, bytes: &[u8]) -> PrivacyResult<Self> {
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| PrivacyError::InvalidKeyLength(bytes.len()))?;
        Ok(Self::from_seed(hasher, seed))
    }

    /// Derive from a wallet signature over a fixed login message
    pub fn from_signature(hasher: &PoseidonHasher, signature: &[u8]) -> Self {
        let mut kdf = blake3::Hasher::new_derive_key(SIGNATURE_CONTEXT);
        kdf.update(signature);
        Self::from_seed(hasher, *kdf.finalize().as_bytes())
    }

    /// Derive from a seed phrase. Surrounding whitespace is ignored.
    pub fn from_phrase(hasher: &PoseidonHasher, phrase: &str) -> Self {
        let mut kdf = blake3::Hasher::new_derive_key(PHRASE_CONTEXT);
        kdf.update(phrase.trim().as_bytes());
        Self::from_seed(hasher, *kdf.finalize().as_bytes())
    }

    pub fn seed(&self) -> &[u8; 32] {
        &self.seed
    }

    pub fn secret(&self) -> &Scalar {
        &self.secret
    }

    pub fn public_key(&self) -> &CurvePoint {
        &self.public_key
    }

    pub fn nullifier_key(&self) -> &NullifierKey {
        &self.nullifier_key
    }

    pub fn viewing_key(&self) -> ViewingKey {
        ViewingKey {
            secret: self.secret,
            public_key: self.public_key,
        }
    }
}

impl std::fmt::Debug for SpendingKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpendingKeypair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Viewing key - allows finding and reading notes but not spending them
///
/// Share this with auditors, wallets, etc. for read-only access.
#[derive(Clone)]
pub struct ViewingKey {
    secret: Scalar,
    public_key: CurvePoint,
}

impl ViewingKey {
    pub fn from_secret(secret: Scalar) -> Self {
        Self {
            secret,
            public_key: derive_public_key(&secret),
        }
    }

    pub fn secret(&self) -> &Scalar {
        &self.secret
    }

    pub fn public_key(&self) -> &CurvePoint {
        &self.public_key
    }
}

impl std::fmt::Debug for ViewingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewingKey")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_key_derivation() {
        let hasher = PoseidonHasher::new();
        let keypair = SpendingKeypair::random(&hasher, &mut OsRng);

        // Same seed should derive the same keys
        let restored = SpendingKeypair::from_seed(&hasher, *keypair.seed());

        assert_eq!(keypair.public_key(), restored.public_key());
        assert_eq!(keypair.nullifier_key(), restored.nullifier_key());
        assert_eq!(
            keypair.viewing_key().public_key(),
            restored.viewing_key().public_key()
        );
    }

    #[test]
    fn test_public_key_in_subgroup() {
        let hasher = PoseidonHasher::new();
        for _ in 0..3 {
            let keypair = SpendingKeypair::random(&hasher, &mut OsRng);
            assert!(keypair.public_key().is_on_curve());
            assert!(keypair.public_key().is_in_subgroup());
        }
    }

    #[test]
    fn test_from_slice_checks_length() {
        let hasher = PoseidonHasher::new();

        assert!(matches!(
            SpendingKeypair::from_slice(&hasher, &[1u8; 31]),
            Err(PrivacyError::InvalidKeyLength(31))
        ));
        assert!(matches!(
            SpendingKeypair::from_slice(&hasher, &[1u8; 33]),
            Err(PrivacyError::InvalidKeyLength(33))
        ));

        let keypair = SpendingKeypair::from_slice(&hasher, &[1u8; 32]).unwrap();
        assert_eq!(keypair.seed(), &[1u8; 32]);
    }

    #[test]
    fn test_signature_and_phrase_derivation() {
        let hasher = PoseidonHasher::new();

        let a = SpendingKeypair::from_signature(&hasher, b"signature bytes");
        let b = SpendingKeypair::from_signature(&hasher, b"signature bytes");
        let c = SpendingKeypair::from_signature(&hasher, b"other signature");
        assert_eq!(a.public_key(), b.public_key());
        assert_ne!(a.public_key(), c.public_key());

        let p1 = SpendingKeypair::from_phrase(&hasher, "correct horse battery staple");
        let p2 = SpendingKeypair::from_phrase(&hasher, "  correct horse battery staple\n");
        assert_eq!(p1.public_key(), p2.public_key());

        // Same input under different contexts yields different keys
        let s = SpendingKeypair::from_signature(&hasher, b"same");
        let p = SpendingKeypair::from_phrase(&hasher, "same");
        assert_ne!(s.public_key(), p.public_key());
    }

    #[test]
    fn test_viewing_key_matches_spending_key() {
        let hasher = PoseidonHasher::new();
        let keypair = SpendingKeypair::random(&hasher, &mut OsRng);
        let vk = keypair.viewing_key();

        assert_eq!(vk.public_key(), keypair.public_key());
        assert_eq!(
            ViewingKey::from_secret(*keypair.secret()).public_key(),
            keypair.public_key()
        );
    }

    #[test]
    fn test_debug_hides_secrets() {
        let hasher = PoseidonHasher::new();
        let keypair = SpendingKeypair::from_seed(&hasher, [0xab; 32]);
        let rendered = format!("{:?} {:?}", keypair, keypair.viewing_key());

        assert!(!rendered.contains("seed"));
        assert!(!rendered.contains("secret"));
    }
}
