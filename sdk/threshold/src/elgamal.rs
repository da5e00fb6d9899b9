//! Exponential ElGamal
//!
//! ```text
//! Enc(m, P; r) = (c1, c2) = (r·G, m·G + r·P)
//! Dec(sk, c)   = c2 - sk·c1 = m·G
//! ```
//!
//! Ciphertexts add componentwise and the plaintexts add with them. Recovering
//! `m` from `m·G` is a discrete-log search, so plaintexts must stay small
//! (vote counts, not balances).
//!
//! Both components of every [`ElGamalCiphertext`] lie in the prime-order
//! subgroup: committee members multiply `c1` by their secret share, and a
//! low-order `c1` would expose that share modulo the cofactor.

use log::debug;
use rand::{CryptoRng, RngCore};
use shade_privacy::{CurvePoint, GENERATOR, IDENTITY, PrivacyError, Scalar, random_scalar};

use crate::shares::ThresholdError;

/// An ElGamal ciphertext over the curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElGamalCiphertext {
    c1: CurvePoint,
    c2: CurvePoint,
}

impl ElGamalCiphertext {
    pub const ENCODED_LEN: usize = 128;

    /// Build from untrusted components; both must be in the subgroup
    pub fn new(c1: CurvePoint, c2: CurvePoint) -> Result<Self, ThresholdError> {
        if !c1.is_in_subgroup() || !c2.is_in_subgroup() {
            return Err(PrivacyError::InvalidPoint.into());
        }
        Ok(Self { c1, c2 })
    }

    /// `r·G`
    pub fn c1(&self) -> &CurvePoint {
        &self.c1
    }

    /// `m·G + r·P`
    pub fn c2(&self) -> &CurvePoint {
        &self.c2
    }

    /// Encryption of zero with no randomness
    pub fn zero() -> Self {
        Self {
            c1: IDENTITY,
            c2: IDENTITY,
        }
    }

    /// Encrypt `message` to `public_key` with explicit randomness `r`
    pub fn encrypt_with(
        message: u64,
        public_key: &CurvePoint,
        r: &Scalar,
    ) -> Result<Self, ThresholdError> {
        if !public_key.is_in_subgroup() {
            return Err(PrivacyError::InvalidPoint.into());
        }
        Ok(Self {
            c1: GENERATOR.mul_scalar(r),
            c2: GENERATOR
                .mul_scalar(&Scalar::from(message))
                .add_point(&public_key.mul_scalar(r)),
        })
    }

    /// Encrypt `message` to `public_key` with fresh randomness
    pub fn encrypt<R: RngCore + CryptoRng>(
        message: u64,
        public_key: &CurvePoint,
        rng: &mut R,
    ) -> Result<Self, ThresholdError> {
        Self::encrypt_with(message, public_key, &random_scalar(rng))
    }

    /// Homomorphic addition
    pub fn add(&self, other: &Self) -> Self {
        Self {
            c1: self.c1.add_point(&other.c1),
            c2: self.c2.add_point(&other.c2),
        }
    }

    /// Sum many ciphertexts
    pub fn sum<'a, I: IntoIterator<Item = &'a ElGamalCiphertext>>(items: I) -> Self {
        items
            .into_iter()
            .fold(Self::zero(), |acc, ct| acc.add(ct))
    }

    /// Same plaintext, fresh randomness
    pub fn rerandomize<R: RngCore + CryptoRng>(
        &self,
        public_key: &CurvePoint,
        rng: &mut R,
    ) -> Result<Self, ThresholdError> {
        Ok(self.add(&Self::encrypt(0, public_key, rng)?))
    }

    /// `c1 || c2`, each point `x || y` big-endian
    pub fn to_bytes(&self) -> [u8; Self::ENCODED_LEN] {
        let mut out = [0u8; Self::ENCODED_LEN];
        out[..64].copy_from_slice(&self.c1.to_bytes());
        out[64..].copy_from_slice(&self.c2.to_bytes());
        out
    }

    /// Parse and validate both points
    pub fn from_bytes(bytes: &[u8; Self::ENCODED_LEN]) -> Result<Self, ThresholdError> {
        let mut c1 = [0u8; 64];
        let mut c2 = [0u8; 64];
        c1.copy_from_slice(&bytes[..64]);
        c2.copy_from_slice(&bytes[64..]);

        Self::new(CurvePoint::from_bytes(&c1)?, CurvePoint::from_bytes(&c2)?)
    }
}

/// `c2 - sk·c1` with the full secret key
pub fn decrypt_to_point(secret_key: &Scalar, ciphertext: &ElGamalCiphertext) -> CurvePoint {
    ciphertext.c2.sub_point(&ciphertext.c1.mul_scalar(secret_key))
}

/// Find `m <= max` with `m·G == point`
pub fn recover_small(point: &CurvePoint, max: u64) -> Result<u64, ThresholdError> {
    let mut acc = IDENTITY;
    for m in 0..=max {
        if acc == *point {
            debug!("discrete log recovered after {} steps", m);
            return Ok(m);
        }
        acc = acc.add_point(&GENERATOR);
    }
    Err(ThresholdError::DiscreteLogNotFound(max))
}
