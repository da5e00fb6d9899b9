//! Note Encryption
//!
//! Encrypts note plaintexts for a recipient with curve Diffie-Hellman and a
//! SHA-256 keystream.
//!
//! ```text
//! Flow:
//! 1. Sender samples ephemeral e, publishes E = e·G
//! 2. Shared secret S = e·Y  (recipient computes y·E)
//! 3. key   = SHA256("shade_note_encryption_v1" || S.x)
//! 4. block 0 at offset 0:  pt[0..32]      ^ SHA256(key || nonce)
//!    block at offset i>0:  pt[i..i+32]    ^ SHA256(key || nonce || be16(i))
//! 5. tag   = SHA256(key || nonce || enc)[0..16]
//!
//! Wire:
//! E.x(32) || E.y(32) || le32(12 + len(enc)) || nonce(12) || enc || tag(16)
//! ```
//!
//! Scanning never fails loudly: every rejection (bad tag, truncated buffer,
//! off-curve ephemeral key, unknown note type) is just "not mine".

use log::debug;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::curve::{CurvePoint, Scalar, derive_public_key, random_scalar};
use crate::error::{PrivacyError, PrivacyResult};
use crate::field::field_to_bytes;
use crate::keys::ViewingKey;
use crate::note::Note;

const NOTE_KEY_DOMAIN: &[u8] = b"shade_note_encryption_v1";

pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;
/// Ephemeral key plus length field
pub const HEADER_LEN: usize = 64 + 4;

const BLOCK_LEN: usize = 32;

/// An encrypted note (published on-chain)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedNote {
    /// Ephemeral public key for Diffie-Hellman
    pub ephemeral_pubkey: CurvePoint,
    pub nonce: [u8; NONCE_LEN],
    /// Encrypted plaintext, same length as the plaintext
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_LEN],
}

impl EncryptedNote {
    /// Fixed overhead on top of the ciphertext
    pub const OVERHEAD: usize = HEADER_LEN + NONCE_LEN + TAG_LEN;

    pub fn encoded_len(&self) -> usize {
        Self::OVERHEAD + self.ciphertext.len()
    }

    /// Serialize to the wire format
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.ephemeral_pubkey.to_bytes());
        out.extend_from_slice(&((NONCE_LEN + self.ciphertext.len()) as u32).to_le_bytes());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        out
    }

    /// Parse the wire format. The ephemeral key must be a valid subgroup point.
    pub fn from_bytes(bytes: &[u8]) -> PrivacyResult<Self> {
        if bytes.len() < Self::OVERHEAD {
            return Err(PrivacyError::MalformedCiphertext);
        }

        let mut epk = [0u8; 64];
        epk.copy_from_slice(&bytes[..64]);

        let mut len = [0u8; 4];
        len.copy_from_slice(&bytes[64..HEADER_LEN]);
        let body_len = u32::from_le_bytes(len) as usize;

        if body_len < NONCE_LEN || bytes.len() != HEADER_LEN + body_len + TAG_LEN {
            return Err(PrivacyError::MalformedCiphertext);
        }

        let ephemeral_pubkey = CurvePoint::from_bytes(&epk)?;

        let body = &bytes[HEADER_LEN..HEADER_LEN + body_len];
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&body[..NONCE_LEN]);

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[HEADER_LEN + body_len..]);

        Ok(Self {
            ephemeral_pubkey,
            nonce,
            ciphertext: body[NONCE_LEN..].to_vec(),
            tag,
        })
    }
}

/// Encrypt a note for a recipient
///
/// A fresh ephemeral scalar and nonce are sampled per call. The recipient key
/// must be in the prime-order subgroup.
pub fn encrypt_note<R: RngCore + CryptoRng>(
    note: &Note,
    recipient: &CurvePoint,
    rng: &mut R,
) -> PrivacyResult<EncryptedNote> {
    if !recipient.is_in_subgroup() {
        return Err(PrivacyError::InvalidPoint);
    }

    let ephemeral = random_scalar(rng);
    let mut nonce = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce);

    Ok(encrypt_with(&note.to_plaintext(), recipient, &ephemeral, nonce))
}

/// Batch encryption for multiple outputs; fails on the first bad recipient
pub fn encrypt_notes<R: RngCore + CryptoRng>(
    notes: &[(Note, CurvePoint)], // (note, recipient)
    rng: &mut R,
) -> PrivacyResult<Vec<EncryptedNote>> {
    notes
        .iter()
        .map(|(note, recipient)| encrypt_note(note, recipient, &mut *rng))
        .collect()
}

pub(crate) fn encrypt_with(
    plaintext: &[u8],
    recipient: &CurvePoint,
    ephemeral: &Scalar,
    nonce: [u8; NONCE_LEN],
) -> EncryptedNote {
    let shared = recipient.mul_scalar(ephemeral);
    let key = derive_note_key(&shared);

    let ciphertext = apply_keystream(&key, &nonce, plaintext);
    let tag = compute_tag(&key, &nonce, &ciphertext);

    EncryptedNote {
        ephemeral_pubkey: derive_public_key(ephemeral),
        nonce,
        ciphertext,
        tag,
    }
}

/// Decrypt a note with the recipient's viewing key
///
/// Returns `AuthenticationFailure` when the tag does not match, which is also
/// what a note addressed to someone else looks like.
pub fn decrypt_note(encrypted: &EncryptedNote, viewing_key: &ViewingKey) -> PrivacyResult<Note> {
    if !encrypted.ephemeral_pubkey.is_in_subgroup() {
        return Err(PrivacyError::InvalidPoint);
    }

    let shared = encrypted.ephemeral_pubkey.mul_scalar(viewing_key.secret());
    let key = derive_note_key(&shared);

    let expected = compute_tag(&key, &encrypted.nonce, &encrypted.ciphertext);
    if !bool::from(expected.ct_eq(&encrypted.tag)) {
        return Err(PrivacyError::AuthenticationFailure);
    }

    let plaintext = apply_keystream(&key, &encrypted.nonce, &encrypted.ciphertext);
    Note::from_plaintext(&plaintext)
}

/// Try to decrypt a note (scan mode - for wallet scanning)
pub fn try_decrypt_note(encrypted: &EncryptedNote, viewing_key: &ViewingKey) -> Option<Note> {
    decrypt_note(encrypted, viewing_key).ok()
}

/// Try to decrypt a raw wire record
pub fn try_decrypt_note_bytes(bytes: &[u8], viewing_key: &ViewingKey) -> Option<Note> {
    let encrypted = EncryptedNote::from_bytes(bytes).ok()?;
    try_decrypt_note(&encrypted, viewing_key)
}

/// Scan wire records, returning `(index, note)` for each one that opens
pub fn scan_notes<I, B>(records: I, viewing_key: &ViewingKey) -> Vec<(usize, Note)>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut scanned = 0usize;
    let found: Vec<(usize, Note)> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            scanned += 1;
            try_decrypt_note_bytes(record.as_ref(), viewing_key).map(|note| (index, note))
        })
        .collect();

    debug!("note scan: {} of {} records matched", found.len(), scanned);
    found
}

/// Derive encryption key from shared secret
fn derive_note_key(shared: &CurvePoint) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(NOTE_KEY_DOMAIN);
    hasher.update(field_to_bytes(&shared.x()));
    hasher.finalize().into()
}

/// XOR `data` with the keystream. Symmetric.
fn apply_keystream(key: &[u8; 32], nonce: &[u8; NONCE_LEN], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());

    for (i, chunk) in data.chunks(BLOCK_LEN).enumerate() {
        let offset = i * BLOCK_LEN;
        let mut hasher = Sha256::new();
        hasher.update(key);
        hasher.update(nonce);
        if offset > 0 {
            hasher.update((offset as u16).to_be_bytes());
        }
        let block = hasher.finalize();

        out.extend(chunk.iter().zip(block.iter()).map(|(a, b)| a ^ b));
    }
    out
}

fn compute_tag(key: &[u8; 32], nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> [u8; TAG_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(key);
    hasher.update(nonce);
    hasher.update(ciphertext);
    let digest = hasher.finalize();

    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&digest[..TAG_LEN]);
    tag
}
