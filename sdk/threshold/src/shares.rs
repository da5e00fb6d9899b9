//! Shamir Secret Sharing over the Curve Scalar Field
//!
//! ```text
//! f(x) = s + a_1·x + ... + a_{k-1}·x^{k-1}      (mod l)
//! share_i = f(i),  i = 1..=n
//!
//! λ_i = Π_{j≠i} x_j / (x_j - x_i)
//! s   = Σ λ_i · share_i
//! ```
//!
//! The same coefficients combine decryption shares in the exponent, so the
//! committee never reassembles the election secret key.

use ark_ff::{One, Zero};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use shade_privacy::{PrivacyError, Scalar, mod_inverse, random_scalar, scalar_from_bytes, scalar_to_bytes};
use thiserror::Error;

/// A share identifier (1-indexed)
pub type ShareId = u8;

/// A secret share
#[derive(Clone, PartialEq, Eq)]
pub struct Share {
    /// Share identifier (1 to N)
    pub id: ShareId,
    /// f(id)
    pub value: Scalar,
}

impl Share {
    /// Create a new share
    pub fn new(id: ShareId, value: Scalar) -> Self {
        Self { id, value }
    }

    /// Serializable form: id plus 32-byte big-endian scalar
    pub fn to_wire(&self) -> WireShare {
        WireShare {
            id: self.id,
            value: scalar_to_bytes(&self.value),
        }
    }

    pub fn from_wire(wire: &WireShare) -> Result<Self, ThresholdError> {
        Ok(Self::new(wire.id, scalar_from_bytes(&wire.value)?))
    }
}

impl std::fmt::Debug for Share {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Share").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Byte form of a [`Share`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireShare {
    pub id: ShareId,
    pub value: [u8; 32],
}

/// Threshold encryption errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ThresholdError {
    #[error("insufficient shares: got {got}, need {need}")]
    InsufficientShares { got: usize, need: usize },

    #[error("invalid threshold: k={k}, n={n}")]
    InvalidThreshold { k: usize, n: usize },

    #[error("duplicate share index {0}")]
    DuplicateShare(ShareId),

    #[error("share index must be non-zero")]
    ZeroShareIndex,

    #[error("unknown committee member {0}")]
    UnknownMember(ShareId),

    #[error("decryption share from member {0} failed proof verification")]
    InvalidShareProof(ShareId),

    #[error("ballot choice {choice} out of range for {options} options")]
    InvalidChoice { choice: usize, options: usize },

    #[error("ballot width mismatch: expected {expected} options, got {got}")]
    BallotWidthMismatch { expected: usize, got: usize },

    #[error("no ballots to tally")]
    EmptyTally,

    #[error("plaintext not found in range 0..={0}")]
    DiscreteLogNotFound(u64),

    #[error(transparent)]
    Privacy(#[from] PrivacyError),
}

/// Split a secret into N shares, requiring K to reconstruct
///
/// # Arguments
/// * `secret` - The scalar to split
/// * `threshold` - K: minimum shares needed to reconstruct
/// * `total` - N: total number of shares to generate
pub fn split_secret<R: RngCore + CryptoRng>(
    secret: &Scalar,
    threshold: usize,
    total: usize,
    rng: &mut R,
) -> Result<Vec<Share>, ThresholdError> {
    if threshold > total || threshold == 0 || total == 0 || total > ShareId::MAX as usize {
        return Err(ThresholdError::InvalidThreshold {
            k: threshold,
            n: total,
        });
    }

    // f(x) = secret + a1*x + ... + a_{k-1}*x^{k-1}
    let mut coeffs = Vec::with_capacity(threshold);
    coeffs.push(*secret);
    for _ in 1..threshold {
        coeffs.push(random_scalar(rng));
    }

    Ok((1..=total as ShareId)
        .map(|id| Share::new(id, evaluate_polynomial(&coeffs, Scalar::from(id))))
        .collect())
}

/// Lagrange coefficient λ_i(0) for `index` within the contributing set
///
/// λ_i(0) = Π_{j≠i} x_j / (x_j - x_i)
pub fn lagrange_coefficient(index: ShareId, indices: &[ShareId]) -> Result<Scalar, ThresholdError> {
    check_indices(indices)?;

    let x_i = Scalar::from(index);
    let mut numerator = Scalar::one();
    let mut denominator = Scalar::one();

    for &j in indices.iter().filter(|&&j| j != index) {
        let x_j = Scalar::from(j);
        numerator *= x_j;
        denominator *= x_j - x_i;
    }

    Ok(numerator * mod_inverse(&denominator)?)
}

/// Combine K shares to reconstruct the secret using Lagrange interpolation
pub fn reconstruct_secret(shares: &[Share], threshold: usize) -> Result<Scalar, ThresholdError> {
    if shares.len() < threshold {
        return Err(ThresholdError::InsufficientShares {
            got: shares.len(),
            need: threshold,
        });
    }

    let shares = &shares[..threshold];
    let indices: Vec<ShareId> = shares.iter().map(|s| s.id).collect();

    shares.iter().try_fold(Scalar::zero(), |acc, share| {
        Ok(acc + share.value * lagrange_coefficient(share.id, &indices)?)
    })
}

pub(crate) fn check_indices(indices: &[ShareId]) -> Result<(), ThresholdError> {
    for (pos, &id) in indices.iter().enumerate() {
        if id == 0 {
            return Err(ThresholdError::ZeroShareIndex);
        }
        if indices[..pos].contains(&id) {
            return Err(ThresholdError::DuplicateShare(id));
        }
    }
    Ok(())
}

/// Evaluate polynomial at point x using Horner's method
fn evaluate_polynomial(coefficients: &[Scalar], x: Scalar) -> Scalar {
    coefficients
        .iter()
        .rev()
        .fold(Scalar::zero(), |acc, coeff| acc * x + coeff)
}
