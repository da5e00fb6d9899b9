//! Stealth Addresses
//!
//! One-time keys a sender derives for a recipient's long-term key `Y = y·G`:
//!
//! ```text
//! Sender                                 Recipient
//! ──────                                 ─────────
//! e  <- random scalar
//! E  = e·G            ── publish E ──►   S = y·E
//! S  = e·Y                               f = H_stealth(S.x) mod l
//! f  = H_stealth(S.x) mod l              x = y + f
//! P  = Y + f·G                           x·G == P
//! ```
//!
//! `P` is unlinkable to `Y` without `y`. The factor uses the full
//! x-coordinate of the shared point.

use rand::{CryptoRng, RngCore};

use crate::curve::{CurvePoint, GENERATOR, Scalar, derive_public_key, random_scalar, scalar_from_field};
use crate::error::{PrivacyError, PrivacyResult};
use crate::hash::{Domain, PoseidonHasher};
use crate::keys::ViewingKey;

/// A published one-time address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StealthAddress {
    pub stealth_pubkey: CurvePoint,
    pub ephemeral_pubkey: CurvePoint,
}

/// Sender-side ephemeral scalar. Never published.
#[derive(Clone)]
pub struct EphemeralSecret(Scalar);

impl EphemeralSecret {
    pub fn scalar(&self) -> &Scalar {
        &self.0
    }
}

impl std::fmt::Debug for EphemeralSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EphemeralSecret(..)")
    }
}

/// `H_stealth(shared.x) mod l`
pub fn stealth_factor(hasher: &PoseidonHasher, shared_secret: &CurvePoint) -> Scalar {
    scalar_from_field(&hasher.hash_with(Domain::StealthFactor, &[shared_secret.x()]))
}

/// Derive a fresh stealth address for `recipient`
///
/// The recipient key is usually read from published data and must be in the
/// prime-order subgroup.
pub fn generate_stealth_address<R: RngCore + CryptoRng>(
    hasher: &PoseidonHasher,
    recipient: &CurvePoint,
    rng: &mut R,
) -> PrivacyResult<(StealthAddress, EphemeralSecret)> {
    if !recipient.is_in_subgroup() {
        return Err(PrivacyError::InvalidPoint);
    }
    let ephemeral = random_scalar(rng);
    let address = stealth_address_with_ephemeral(hasher, recipient, &ephemeral);
    Ok((address, EphemeralSecret(ephemeral)))
}

pub(crate) fn stealth_address_with_ephemeral(
    hasher: &PoseidonHasher,
    recipient: &CurvePoint,
    ephemeral: &Scalar,
) -> StealthAddress {
    let ephemeral_pubkey = derive_public_key(ephemeral);
    let shared = recipient.mul_scalar(ephemeral);
    let factor = stealth_factor(hasher, &shared);

    StealthAddress {
        stealth_pubkey: recipient.add_point(&GENERATOR.mul_scalar(&factor)),
        ephemeral_pubkey,
    }
}

/// Recover the one-time private key for an address sent to `y·G`.
///
/// The ephemeral key is untrusted input and must be in the prime-order subgroup.
pub fn derive_stealth_private_key(
    hasher: &PoseidonHasher,
    recipient_secret: &Scalar,
    ephemeral_pubkey: &CurvePoint,
) -> PrivacyResult<Scalar> {
    if !ephemeral_pubkey.is_in_subgroup() {
        return Err(PrivacyError::InvalidPoint);
    }
    let shared = ephemeral_pubkey.mul_scalar(recipient_secret);
    Ok(*recipient_secret + stealth_factor(hasher, &shared))
}

/// True when `address` was generated for the holder of `viewing_key`
pub fn check_stealth_ownership(
    hasher: &PoseidonHasher,
    viewing_key: &ViewingKey,
    address: &StealthAddress,
) -> bool {
    match derive_stealth_private_key(hasher, viewing_key.secret(), &address.ephemeral_pubkey) {
        Ok(secret) => derive_public_key(&secret) == address.stealth_pubkey,
        Err(_) => false,
    }
}
