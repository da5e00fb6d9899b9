//! Chaum-Pedersen proof of equal discrete logs
//!
//! A committee member publishes `share = sk_i·c1` next to its verification
//! key `pk_i = sk_i·G` and proves both use the same `sk_i`:
//!
//! ```text
//! prover:   k ← random,  A = k·G,  B = k·c1
//!           c = H(G, pk, c1, share, A, B)
//!           s = k - c·sk
//! verifier: A' = s·G + c·pk,  B' = s·c1 + c·share
//!           accept iff H(G, pk, c1, share, A', B') == c
//! ```
//!
//! `H` is Poseidon over the twelve coordinates with no domain constant,
//! reduced into the scalar field.
//!
//! The equations only pin `share` down to the prime-order subgroup. A share
//! shifted by a low-order point `T` still passes whenever `c·T` vanishes, so
//! the verifier rejects any point outside the subgroup before checking them.

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use shade_privacy::{
    CurvePoint, GENERATOR, PoseidonHasher, Scalar, random_scalar, scalar_from_bytes,
    scalar_from_field, scalar_to_bytes,
};

use crate::shares::ThresholdError;

/// Non-interactive proof `(c, s)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DleqProof {
    pub challenge: Scalar,
    pub response: Scalar,
}

impl DleqProof {
    /// Prove `public_key = secret·G` and `share = secret·base` for the same secret
    pub fn prove<R: RngCore + CryptoRng>(
        hasher: &PoseidonHasher,
        secret: &Scalar,
        public_key: &CurvePoint,
        base: &CurvePoint,
        share: &CurvePoint,
        rng: &mut R,
    ) -> Self {
        let k = random_scalar(rng);
        let a = GENERATOR.mul_scalar(&k);
        let b = base.mul_scalar(&k);

        let challenge = challenge(hasher, public_key, base, share, &a, &b);
        let response = k - challenge * secret;

        Self {
            challenge,
            response,
        }
    }

    /// Check the proof against the published points
    pub fn verify(
        &self,
        hasher: &PoseidonHasher,
        public_key: &CurvePoint,
        base: &CurvePoint,
        share: &CurvePoint,
    ) -> bool {
        if ![public_key, base, share].iter().all(|p| p.is_in_subgroup()) {
            return false;
        }

        let a = GENERATOR
            .mul_scalar(&self.response)
            .add_point(&public_key.mul_scalar(&self.challenge));
        let b = base
            .mul_scalar(&self.response)
            .add_point(&share.mul_scalar(&self.challenge));

        challenge(hasher, public_key, base, share, &a, &b) == self.challenge
    }

    pub fn to_wire(&self) -> WireDleqProof {
        WireDleqProof {
            challenge: scalar_to_bytes(&self.challenge),
            response: scalar_to_bytes(&self.response),
        }
    }

    pub fn from_wire(wire: &WireDleqProof) -> Result<Self, ThresholdError> {
        Ok(Self {
            challenge: scalar_from_bytes(&wire.challenge)?,
            response: scalar_from_bytes(&wire.response)?,
        })
    }
}

/// Byte form of a [`DleqProof`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireDleqProof {
    pub challenge: [u8; 32],
    pub response: [u8; 32],
}

fn challenge(
    hasher: &PoseidonHasher,
    public_key: &CurvePoint,
    base: &CurvePoint,
    share: &CurvePoint,
    a: &CurvePoint,
    b: &CurvePoint,
) -> Scalar {
    let inputs: Vec<_> = [&GENERATOR, public_key, base, share, a, b]
        .into_iter()
        .flat_map(|p| [p.x(), p.y()])
        .collect();

    scalar_from_field(&hasher.hash(&inputs, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::{BigInteger, One, PrimeField, Zero};
    use rand::{SeedableRng, rngs::StdRng};
    use shade_privacy::{Fr, derive_public_key};

    struct Setup {
        hasher: PoseidonHasher,
        sk: Scalar,
        pk: CurvePoint,
        base: CurvePoint,
        share: CurvePoint,
    }

    fn setup(rng: &mut StdRng) -> Setup {
        let sk = random_scalar(rng);
        let base = derive_public_key(&random_scalar(rng));
        Setup {
            hasher: PoseidonHasher::new(),
            sk,
            pk: derive_public_key(&sk),
            base,
            share: base.mul_scalar(&sk),
        }
    }

    #[test]
    fn test_honest_proof_verifies() {
        let mut rng = StdRng::seed_from_u64(1);
        let s = setup(&mut rng);

        let proof = DleqProof::prove(&s.hasher, &s.sk, &s.pk, &s.base, &s.share, &mut rng);
        assert!(proof.verify(&s.hasher, &s.pk, &s.base, &s.share));
    }

    #[test]
    fn test_random_share_rejected() {
        let mut rng = StdRng::seed_from_u64(2);
        let s = setup(&mut rng);

        let proof = DleqProof::prove(&s.hasher, &s.sk, &s.pk, &s.base, &s.share, &mut rng);
        let forged = derive_public_key(&random_scalar(&mut rng));
        assert!(!proof.verify(&s.hasher, &s.pk, &s.base, &forged));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let mut rng = StdRng::seed_from_u64(3);
        let s = setup(&mut rng);

        // Share computed with a different secret than the published key
        let other = random_scalar(&mut rng);
        let share = s.base.mul_scalar(&other);
        let proof = DleqProof::prove(&s.hasher, &other, &s.pk, &s.base, &share, &mut rng);
        assert!(!proof.verify(&s.hasher, &s.pk, &s.base, &share));
    }

    #[test]
    fn test_tampered_response_rejected() {
        let mut rng = StdRng::seed_from_u64(4);
        let s = setup(&mut rng);

        let mut proof = DleqProof::prove(&s.hasher, &s.sk, &s.pk, &s.base, &s.share, &mut rng);
        proof.response += Scalar::from(1u64);
        assert!(!proof.verify(&s.hasher, &s.pk, &s.base, &s.share));
    }

    #[test]
    fn test_torsion_shifted_share_rejected() {
        let mut rng = StdRng::seed_from_u64(6);
        let s = setup(&mut rng);
        let torsion = CurvePoint::new(Fr::zero(), -Fr::one()).unwrap();
        let shifted = s.share.add_point(&torsion);

        // With an even challenge the shift cancels out of `c·share`
        let proof = loop {
            let proof = DleqProof::prove(&s.hasher, &s.sk, &s.pk, &s.base, &shifted, &mut rng);
            if proof.challenge.into_bigint().is_even() {
                break proof;
            }
        };
        assert_eq!(
            shifted.mul_scalar(&proof.challenge),
            s.share.mul_scalar(&proof.challenge)
        );
        assert!(!proof.verify(&s.hasher, &s.pk, &s.base, &shifted));

        // Low-order base or key is refused as well
        let proof = DleqProof::prove(&s.hasher, &s.sk, &s.pk, &s.base, &s.share, &mut rng);
        assert!(!proof.verify(&s.hasher, &s.pk, &s.base.add_point(&torsion), &s.share));
        assert!(!proof.verify(&s.hasher, &s.pk.add_point(&torsion), &s.base, &s.share));
    }

    #[test]
    fn test_wire_roundtrip() {
        let mut rng = StdRng::seed_from_u64(5);
        let s = setup(&mut rng);

        let proof = DleqProof::prove(&s.hasher, &s.sk, &s.pk, &s.base, &s.share, &mut rng);
        let restored = DleqProof::from_wire(&proof.to_wire()).unwrap();
        assert!(restored.verify(&s.hasher, &s.pk, &s.base, &s.share));
    }
}
