//! Note Commitments
//!
//! Poseidon commitments binding every field of a note.
//!
//! ```text
//! Standard:  C = H_commit(stealth_x, token, amount, randomness)
//!
//! Position:  inner = H_commit(1, stealth_x, token, market, is_long)
//!            C     = H(inner, size, leverage, entry_price, randomness)
//!
//! Lp:        inner = H_commit(2, stealth_x, token, pool, amount)
//!            C     = H(inner, lp_amount, randomness)
//! ```
//!
//! The two-stage forms match the spend circuit's constraint layout and must
//! not be folded into a single hash.

use serde::{Deserialize, Serialize};

use crate::field::{Fr, bytes_to_field, field_to_bytes};
use crate::hash::{Domain, PoseidonHasher};
use crate::note::{Note, NoteKind, NoteType};

/// A note commitment (32 bytes, big-endian `Fr`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment(pub [u8; 32]);

impl Commitment {
    /// Create commitment from field element
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
}

impl AsRef<[u8]> for Commitment {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Commit to a note of any shape
pub fn compute_commitment(hasher: &PoseidonHasher, note: &Note) -> Commitment {
    let stealth_x = note.stealth_pub_x;
    let token = note.token.to_field();
    let amount = Fr::from(note.amount);

    let result = match note.kind {
        NoteKind::Standard => hasher.hash_with(
            Domain::NoteCommitment,
            &[stealth_x, token, amount, note.randomness],
        ),
        NoteKind::Position {
            market,
            is_long,
            leverage,
            entry_price,
        } => {
            let inner = hasher.hash_with(
                Domain::NoteCommitment,
                &[
                    Fr::from(NoteType::Position as u8),
                    stealth_x,
                    token,
                    market.to_field(),
                    Fr::from(is_long),
                ],
            );
            hasher.hash(
                &[
                    inner,
                    amount,
                    Fr::from(leverage),
                    Fr::from(entry_price),
                    note.randomness,
                ],
                None,
            )
        }
        NoteKind::Lp { pool, lp_amount } => {
            let inner = hasher.hash_with(
                Domain::NoteCommitment,
                &[
                    Fr::from(NoteType::Lp as u8),
                    stealth_x,
                    token,
                    pool.to_field(),
                    amount,
                ],
            );
            hasher.hash(&[inner, Fr::from(lp_amount), note.randomness], None)
        }
    };

    Commitment::from_field(result)
}

/// Recompute and compare as reduced field elements
pub fn verify_commitment(hasher: &PoseidonHasher, commitment: &Commitment, note: &Note) -> bool {
    compute_commitment(hasher, note).to_field() == commitment.to_field()
}
