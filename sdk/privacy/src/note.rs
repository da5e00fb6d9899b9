//! Shielded Notes
//!
//! A note is value held privately under a one-time stealth key. Three shapes
//! share one commitment/nullifier scheme:
//!
//! ```text
//! Standard = { stealth_pub_x, token, amount, randomness }
//! Position = Standard + { market, is_long, leverage, entry_price }
//! Lp       = Standard + { pool, lp_amount }
//! ```
//!
//! Plaintext encoding (what gets encrypted for the recipient):
//!
//! ```text
//! kind(1) || stealth_pub_x(32) || token(32) || amount u64 BE(8) || randomness(32)
//!   kind 1: || market(32) || is_long(1) || leverage u16 BE(2) || entry_price u64 BE(8)
//!   kind 2: || pool(32) || lp_amount u64 BE(8)
//! ```

use ark_ff::UniformRand;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::commitment::{Commitment, compute_commitment};
use crate::error::{PrivacyError, PrivacyResult};
use crate::field::{Fr, bytes_to_field, field_to_bytes};
use crate::hash::PoseidonHasher;
use crate::nullifier::{Nullifier, NullifierKey};

pub const STANDARD_PLAINTEXT_LEN: usize = 105;
pub const POSITION_PLAINTEXT_LEN: usize = 148;
pub const LP_PLAINTEXT_LEN: usize = 145;

/// What an [`Identifier`] names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentifierKind {
    Token,
    Market,
    Pool,
}

/// Fixed-width asset/market/pool identifier, tagged with what it names.
///
/// The tag is local bookkeeping; only the 32 bytes enter hashes and plaintexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub kind: IdentifierKind,
    pub bytes: [u8; 32],
}

impl Identifier {
    pub fn token(bytes: [u8; 32]) -> Self {
        Self {
            kind: IdentifierKind::Token,
            bytes,
        }
    }

    pub fn market(bytes: [u8; 32]) -> Self {
        Self {
            kind: IdentifierKind::Market,
            bytes,
        }
    }

    pub fn pool(bytes: [u8; 32]) -> Self {
        Self {
            kind: IdentifierKind::Pool,
            bytes,
        }
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Identifier reduced into `Fr`
    pub fn to_field(&self) -> Fr {
        bytes_to_field(&self.bytes)
    }
}

impl AsRef<[u8]> for Identifier {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Plaintext type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NoteType {
    Standard = 0,
    Position = 1,
    Lp = 2,
}

impl NoteType {
    pub fn plaintext_len(self) -> usize {
        match self {
            NoteType::Standard => STANDARD_PLAINTEXT_LEN,
            NoteType::Position => POSITION_PLAINTEXT_LEN,
            NoteType::Lp => LP_PLAINTEXT_LEN,
        }
    }
}

impl TryFrom<u8> for NoteType {
    type Error = PrivacyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(NoteType::Standard),
            1 => Ok(NoteType::Position),
            2 => Ok(NoteType::Lp),
            other => Err(PrivacyError::UnknownNoteType(other)),
        }
    }
}

/// Shape-specific note fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    Standard,
    Position {
        market: Identifier,
        is_long: bool,
        leverage: u16,
        entry_price: u64,
    },
    Lp {
        pool: Identifier,
        lp_amount: u64,
    },
}

/// A shielded note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    /// x-coordinate of the owner's one-time stealth key
    pub stealth_pub_x: Fr,
    pub token: Identifier,
    /// Amount in the smallest unit (position size for position notes)
    pub amount: u64,
    /// Blinding factor
    pub randomness: Fr,
    pub kind: NoteKind,
}

impl Note {
    /// Standard note with fresh blinding
    pub fn standard<R: RngCore + CryptoRng>(
        stealth_pub_x: Fr,
        token: Identifier,
        amount: u64,
        rng: &mut R,
    ) -> Self {
        Self::with_randomness(stealth_pub_x, token, amount, Fr::rand(rng), NoteKind::Standard)
    }

    /// Position note with fresh blinding
    #[allow(clippy::too_many_arguments)]
    pub fn position<R: RngCore + CryptoRng>(
        stealth_pub_x: Fr,
        token: Identifier,
        market: Identifier,
        size: u64,
        is_long: bool,
        leverage: u16,
        entry_price: u64,
        rng: &mut R,
    ) -> Self {
        Self::with_randomness(
            stealth_pub_x,
            token,
            size,
            Fr::rand(rng),
            NoteKind::Position {
                market,
                is_long,
                leverage,
                entry_price,
            },
        )
    }

    /// LP note with fresh blinding
    pub fn lp<R: RngCore + CryptoRng>(
        stealth_pub_x: Fr,
        token: Identifier,
        pool: Identifier,
        amount: u64,
        lp_amount: u64,
        rng: &mut R,
    ) -> Self {
        Self::with_randomness(
            stealth_pub_x,
            token,
            amount,
            Fr::rand(rng),
            NoteKind::Lp { pool, lp_amount },
        )
    }

    /// Note with explicit randomness (recovery and tests)
    pub fn with_randomness(
        stealth_pub_x: Fr,
        token: Identifier,
        amount: u64,
        randomness: Fr,
        kind: NoteKind,
    ) -> Self {
        Self {
            stealth_pub_x,
            token,
            amount,
            randomness,
            kind,
        }
    }

    pub fn note_type(&self) -> NoteType {
        match self.kind {
            NoteKind::Standard => NoteType::Standard,
            NoteKind::Position { .. } => NoteType::Position,
            NoteKind::Lp { .. } => NoteType::Lp,
        }
    }

    /// Compute the commitment for this note
    pub fn commitment(&self, hasher: &PoseidonHasher) -> Commitment {
        compute_commitment(hasher, self)
    }

    /// Spend nullifier for this note stored at `leaf_index`
    pub fn nullifier(&self, hasher: &PoseidonHasher, nk: &NullifierKey, leaf_index: u64) -> Nullifier {
        nk.spend_nullifier(hasher, &self.commitment(hasher), leaf_index)
    }

    /// Fixed-width plaintext with a leading type discriminator
    pub fn to_plaintext(&self) -> Vec<u8> {
        let note_type = self.note_type();
        let mut out = Vec::with_capacity(note_type.plaintext_len());

        out.push(note_type as u8);
        out.extend_from_slice(&field_to_bytes(&self.stealth_pub_x));
        out.extend_from_slice(&self.token.bytes);
        out.extend_from_slice(&self.amount.to_be_bytes());
        out.extend_from_slice(&field_to_bytes(&self.randomness));

        match self.kind {
            NoteKind::Standard => {}
            NoteKind::Position {
                market,
                is_long,
                leverage,
                entry_price,
            } => {
                out.extend_from_slice(&market.bytes);
                out.push(is_long as u8);
                out.extend_from_slice(&leverage.to_be_bytes());
                out.extend_from_slice(&entry_price.to_be_bytes());
            }
            NoteKind::Lp { pool, lp_amount } => {
                out.extend_from_slice(&pool.bytes);
                out.extend_from_slice(&lp_amount.to_be_bytes());
            }
        }
        out
    }

    /// Decode a plaintext, checking the discriminator and its fixed width
    pub fn from_plaintext(bytes: &[u8]) -> PrivacyResult<Self> {
        let (&tag, _) = bytes.split_first().ok_or(PrivacyError::NoteLengthMismatch {
            got: 0,
            expected: STANDARD_PLAINTEXT_LEN,
        })?;
        let note_type = NoteType::try_from(tag)?;
        if bytes.len() != note_type.plaintext_len() {
            return Err(PrivacyError::NoteLengthMismatch {
                got: bytes.len(),
                expected: note_type.plaintext_len(),
            });
        }

        let mut reader = Reader::new(&bytes[1..]);
        let stealth_pub_x = bytes_to_field(&reader.array::<32>());
        let token = Identifier::token(reader.array::<32>());
        let amount = u64::from_be_bytes(reader.array::<8>());
        let randomness = bytes_to_field(&reader.array::<32>());

        let kind = match note_type {
            NoteType::Standard => NoteKind::Standard,
            NoteType::Position => NoteKind::Position {
                market: Identifier::market(reader.array::<32>()),
                is_long: reader.array::<1>()[0] != 0,
                leverage: u16::from_be_bytes(reader.array::<2>()),
                entry_price: u64::from_be_bytes(reader.array::<8>()),
            },
            NoteType::Lp => NoteKind::Lp {
                pool: Identifier::pool(reader.array::<32>()),
                lp_amount: u64::from_be_bytes(reader.array::<8>()),
            },
        };

        Ok(Self {
            stealth_pub_x,
            token,
            amount,
            randomness,
            kind,
        })
    }
}

/// Cursor over a buffer whose length was already checked
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        out
    }
}
