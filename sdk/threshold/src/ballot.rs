//! Encrypted ballots
//!
//! A ballot holds one ciphertext per option. The chosen option encrypts the
//! voter's weight and every other option encrypts zero, so summing ballots
//! option-by-option yields encrypted per-option totals.

use rand::{CryptoRng, RngCore};
use shade_privacy::CurvePoint;

use crate::elgamal::ElGamalCiphertext;
use crate::shares::ThresholdError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBallot {
    pub options: Vec<ElGamalCiphertext>,
}

impl EncryptedBallot {
    /// Encrypt a vote of `weight` for `choice` out of `num_options`
    pub fn new<R: RngCore + CryptoRng>(
        choice: usize,
        weight: u64,
        num_options: usize,
        election_key: &CurvePoint,
        rng: &mut R,
    ) -> Result<Self, ThresholdError> {
        if choice >= num_options {
            return Err(ThresholdError::InvalidChoice {
                choice,
                options: num_options,
            });
        }

        let options = (0..num_options)
            .map(|i| {
                let m = if i == choice { weight } else { 0 };
                ElGamalCiphertext::encrypt(m, election_key, rng)
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { options })
    }

    pub fn num_options(&self) -> usize {
        self.options.len()
    }
}

/// Per-option homomorphic sum of `ballots`
pub fn tally(ballots: &[EncryptedBallot]) -> Result<Vec<ElGamalCiphertext>, ThresholdError> {
    let first = ballots.first().ok_or(ThresholdError::EmptyTally)?;
    let width = first.num_options();

    let mut totals = vec![ElGamalCiphertext::zero(); width];
    for ballot in ballots {
        if ballot.num_options() != width {
            return Err(ThresholdError::BallotWidthMismatch {
                expected: width,
                got: ballot.num_options(),
            });
        }
        for (total, ct) in totals.iter_mut().zip(&ballot.options) {
            *total = total.add(ct);
        }
    }
    Ok(totals)
}
