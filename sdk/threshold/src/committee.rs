//! Committee Management
//!
//! Manages the t-of-n committee that holds the election secret key. Each
//! member publishes `sk_i·c1` for a tally ciphertext along with a DLEQ proof;
//! any `threshold` valid shares interpolate to `sk·c1` without anyone
//! learning `sk`.

use log::{debug, warn};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use shade_privacy::{CurvePoint, IDENTITY, PoseidonHasher, Scalar, derive_public_key, random_scalar};

use crate::dleq::DleqProof;
use crate::elgamal::{ElGamalCiphertext, recover_small};
use crate::shares::{Share, ShareId, ThresholdError, check_indices, lagrange_coefficient, split_secret};

/// Committee configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitteeConfig {
    /// Threshold K: minimum members needed to decrypt
    pub threshold: usize,
    /// Total members N
    pub total_members: usize,
    /// Epoch number (for key rotation)
    #[serde(default)]
    pub epoch: u64,
}

impl CommitteeConfig {
    pub fn new(threshold: usize, total_members: usize) -> Self {
        Self {
            threshold,
            total_members,
            epoch: 0,
        }
    }

    /// Check if config is valid
    pub fn is_valid(&self) -> bool {
        self.threshold > 0
            && self.threshold <= self.total_members
            && self.total_members <= ShareId::MAX as usize
    }

    fn check(&self) -> Result<(), ThresholdError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ThresholdError::InvalidThreshold {
                k: self.threshold,
                n: self.total_members,
            })
        }
    }
}

/// A committee member's public record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitteeMember {
    /// Member ID (1-indexed, equal to its share index)
    pub id: ShareId,
    /// `sk_i·G`, checked against every decryption share
    pub verification_key: CurvePoint,
    /// Optional endpoint URL for decryption requests
    pub endpoint: Option<String>,
}

impl CommitteeMember {
    pub fn new(id: ShareId, verification_key: CurvePoint) -> Self {
        Self {
            id,
            verification_key,
            endpoint: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = Some(endpoint);
        self
    }
}

/// A member's partial decryption of `c1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecryptionShare {
    pub index: ShareId,
    /// `sk_i·c1`
    pub point: CurvePoint,
    pub proof: DleqProof,
}

/// The threshold decryption committee
#[derive(Debug, Clone)]
pub struct Committee {
    /// Committee configuration
    pub config: CommitteeConfig,
    /// Committee members
    pub members: Vec<CommitteeMember>,
    /// Election public key `sk·G`
    pub election_key: CurvePoint,
}

impl Committee {
    /// Create a committee from its public records
    pub fn new(
        config: CommitteeConfig,
        members: Vec<CommitteeMember>,
        election_key: CurvePoint,
    ) -> Result<Self, ThresholdError> {
        config.check()?;
        if members.len() != config.total_members {
            return Err(ThresholdError::InvalidThreshold {
                k: config.threshold,
                n: members.len(),
            });
        }
        let ids: Vec<ShareId> = members.iter().map(|m| m.id).collect();
        check_indices(&ids)?;

        Ok(Self {
            config,
            members,
            election_key,
        })
    }

    /// Get member by ID
    pub fn member(&self, id: ShareId) -> Option<&CommitteeMember> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Check if we have enough shares for decryption
    pub fn can_decrypt(&self, shares: &[DecryptionShare]) -> bool {
        shares.len() >= self.config.threshold
    }

    /// Interpolate `sk·c1` from `threshold` verified shares
    ///
    /// Shares with a failing proof or a point outside the subgroup are
    /// skipped. Duplicate or unknown indices are errors.
    pub fn combine(
        &self,
        hasher: &PoseidonHasher,
        ciphertext: &ElGamalCiphertext,
        shares: &[DecryptionShare],
    ) -> Result<CurvePoint, ThresholdError> {
        let indices: Vec<ShareId> = shares.iter().map(|s| s.index).collect();
        check_indices(&indices)?;

        let mut valid = Vec::with_capacity(self.config.threshold);
        for share in shares {
            let member = self
                .member(share.index)
                .ok_or(ThresholdError::UnknownMember(share.index))?;

            if !share
                .proof
                .verify(hasher, &member.verification_key, ciphertext.c1(), &share.point)
            {
                warn!(
                    "rejecting decryption share from member {}: proof failed",
                    share.index
                );
                continue;
            }

            valid.push(share);
            if valid.len() == self.config.threshold {
                break;
            }
        }

        if valid.len() < self.config.threshold {
            return Err(ThresholdError::InsufficientShares {
                got: valid.len(),
                need: self.config.threshold,
            });
        }

        let used: Vec<ShareId> = valid.iter().map(|s| s.index).collect();
        let mut combined = IDENTITY;
        for share in valid {
            let lambda = lagrange_coefficient(share.index, &used)?;
            combined = combined.add_point(&share.point.mul_scalar(&lambda));
        }
        Ok(combined)
    }

    /// `m·G` for the ciphertext
    pub fn decrypt_to_point(
        &self,
        hasher: &PoseidonHasher,
        ciphertext: &ElGamalCiphertext,
        shares: &[DecryptionShare],
    ) -> Result<CurvePoint, ThresholdError> {
        let combined = self.combine(hasher, ciphertext, shares)?;
        Ok(ciphertext.c2().sub_point(&combined))
    }

    /// Recover a small plaintext, searching `0..=max`
    pub fn decrypt_tally(
        &self,
        hasher: &PoseidonHasher,
        ciphertext: &ElGamalCiphertext,
        shares: &[DecryptionShare],
        max: u64,
    ) -> Result<u64, ThresholdError> {
        let point = self.decrypt_to_point(hasher, ciphertext, shares)?;
        recover_small(&point, max)
    }
}

/// Committee member with its secret share (for the local member)
#[derive(Clone)]
pub struct LocalCommitteeMember {
    share: Share,
    pub verification_key: CurvePoint,
}

impl LocalCommitteeMember {
    pub fn from_share(share: Share) -> Self {
        let verification_key = derive_public_key(&share.value);
        Self {
            share,
            verification_key,
        }
    }

    pub fn id(&self) -> ShareId {
        self.share.id
    }

    /// Get the public member info
    pub fn to_member(&self) -> CommitteeMember {
        CommitteeMember::new(self.share.id, self.verification_key)
    }

    /// `sk_i·c1` with a proof against this member's verification key
    ///
    /// `c1` is in the subgroup for every [`ElGamalCiphertext`], so the share
    /// reveals nothing about `sk_i` beyond the proven relation.
    pub fn decryption_share<R: RngCore + CryptoRng>(
        &self,
        hasher: &PoseidonHasher,
        ciphertext: &ElGamalCiphertext,
        rng: &mut R,
    ) -> DecryptionShare {
        let point = ciphertext.c1().mul_scalar(&self.share.value);
        let proof = DleqProof::prove(
            hasher,
            &self.share.value,
            &self.verification_key,
            ciphertext.c1(),
            &point,
            rng,
        );

        DecryptionShare {
            index: self.share.id,
            point,
            proof,
        }
    }
}

impl std::fmt::Debug for LocalCommitteeMember {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCommitteeMember")
            .field("id", &self.share.id)
            .field("verification_key", &self.verification_key)
            .finish_non_exhaustive()
    }
}

/// Trusted-dealer setup: sample the election key and deal its shares
pub fn generate_committee<R: RngCore + CryptoRng>(
    config: CommitteeConfig,
    rng: &mut R,
) -> Result<(Committee, Vec<LocalCommitteeMember>), ThresholdError> {
    config.check()?;

    let secret: Scalar = random_scalar(rng);
    let election_key = derive_public_key(&secret);

    let locals: Vec<LocalCommitteeMember> =
        split_secret(&secret, config.threshold, config.total_members, rng)?
            .into_iter()
            .map(LocalCommitteeMember::from_share)
            .collect();
    let members = locals.iter().map(LocalCommitteeMember::to_member).collect();

    debug!(
        "dealt {}-of-{} committee for epoch {}",
        config.threshold, config.total_members, config.epoch
    );

    Ok((Committee::new(config, members, election_key)?, locals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elgamal::decrypt_to_point;
    use ark_ff::{BigInteger, One, PrimeField, Zero};
    use rand::{SeedableRng, rngs::StdRng};
    use shade_privacy::Fr;

    fn committee(k: usize, n: usize, seed: u64) -> (Committee, Vec<LocalCommitteeMember>, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let (committee, locals) = generate_committee(CommitteeConfig::new(k, n), &mut rng).unwrap();
        (committee, locals, rng)
    }

    #[test]
    fn test_committee_creation() {
        let (committee, locals, _) = committee(3, 5, 1);

        assert!(committee.config.is_valid());
        assert_eq!(committee.members.len(), 5);
        assert_eq!(locals[2].id(), 3);
        assert_eq!(committee.member(3).unwrap().verification_key, locals[2].verification_key);
        assert!(committee.member(6).is_none());
    }

    #[test]
    fn test_invalid_config() {
        let mut rng = StdRng::seed_from_u64(2);
        assert!(!CommitteeConfig::new(4, 3).is_valid());
        assert!(matches!(
            generate_committee(CommitteeConfig::new(0, 3), &mut rng),
            Err(ThresholdError::InvalidThreshold { k: 0, n: 3 })
        ));
    }

    #[test]
    fn test_duplicate_member_ids_rejected() {
        let (committee, _, _) = committee(2, 3, 3);
        let mut members = committee.members.clone();
        members[1].id = members[0].id;

        assert!(matches!(
            Committee::new(committee.config.clone(), members, committee.election_key),
            Err(ThresholdError::DuplicateShare(1))
        ));
    }

    #[test]
    fn test_threshold_decrypt_matches_direct() {
        let (committee, locals, mut rng) = committee(3, 5, 4);
        let hasher = PoseidonHasher::new();

        let ct = ElGamalCiphertext::encrypt(11, &committee.election_key, &mut rng).unwrap();
        let shares: Vec<_> = [&locals[4], &locals[0], &locals[2]]
            .iter()
            .map(|m| m.decryption_share(&hasher, &ct, &mut rng))
            .collect();

        assert_eq!(committee.decrypt_tally(&hasher, &ct, &shares, 100).unwrap(), 11);
    }

    #[test]
    fn test_any_subset_gives_same_point() {
        let (committee, locals, mut rng) = committee(2, 4, 5);
        let hasher = PoseidonHasher::new();
        let ct = ElGamalCiphertext::encrypt(3, &committee.election_key, &mut rng).unwrap();

        let all: Vec<_> = locals
            .iter()
            .map(|m| m.decryption_share(&hasher, &ct, &mut rng))
            .collect();

        let a = committee.combine(&hasher, &ct, &all[0..2]).unwrap();
        let b = committee.combine(&hasher, &ct, &all[2..4]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bad_share_skipped() {
        let (committee, locals, mut rng) = committee(2, 3, 6);
        let hasher = PoseidonHasher::new();
        let ct = ElGamalCiphertext::encrypt(5, &committee.election_key, &mut rng).unwrap();

        let mut shares: Vec<_> = locals
            .iter()
            .map(|m| m.decryption_share(&hasher, &ct, &mut rng))
            .collect();
        shares[0].point = derive_public_key(&random_scalar(&mut rng));

        // Two honest shares remain
        assert_eq!(committee.decrypt_tally(&hasher, &ct, &shares, 10).unwrap(), 5);

        // Only one honest share remains
        assert_eq!(
            committee.combine(&hasher, &ct, &shares[..2]),
            Err(ThresholdError::InsufficientShares { got: 1, need: 2 })
        );
    }

    #[test]
    fn test_torsion_shifted_share_skipped() {
        let (committee, locals, mut rng) = committee(2, 3, 9);
        let hasher = PoseidonHasher::new();
        let ct = ElGamalCiphertext::encrypt(2, &committee.election_key, &mut rng).unwrap();
        let torsion = CurvePoint::new(Fr::zero(), -Fr::one()).unwrap();

        let honest = locals[0].decryption_share(&hasher, &ct, &mut rng);

        // Member 2 shifts its point by an order-2 point and retries until
        // the challenge is even, so the shift drops out of the proof equations
        let cheat = &locals[1];
        let point = ct.c1().mul_scalar(&cheat.share.value).add_point(&torsion);
        let proof = loop {
            let proof = DleqProof::prove(
                &hasher,
                &cheat.share.value,
                &cheat.verification_key,
                ct.c1(),
                &point,
                &mut rng,
            );
            if proof.challenge.into_bigint().is_even() {
                break proof;
            }
        };
        let shifted = DecryptionShare {
            index: cheat.id(),
            point,
            proof,
        };

        assert_eq!(
            committee.combine(&hasher, &ct, &[shifted, honest]),
            Err(ThresholdError::InsufficientShares { got: 1, need: 2 })
        );

        let third = locals[2].decryption_share(&hasher, &ct, &mut rng);
        assert_eq!(
            committee
                .decrypt_tally(&hasher, &ct, &[shifted, honest, third], 10)
                .unwrap(),
            2
        );
    }

    #[test]
    fn test_combine_rejects_unknown_and_duplicate() {
        let (committee, locals, mut rng) = committee(2, 3, 7);
        let hasher = PoseidonHasher::new();
        let ct = ElGamalCiphertext::encrypt(1, &committee.election_key, &mut rng).unwrap();

        let share = locals[0].decryption_share(&hasher, &ct, &mut rng);
        assert_eq!(
            committee.combine(&hasher, &ct, &[share, share]),
            Err(ThresholdError::DuplicateShare(1))
        );

        let mut stray = share;
        stray.index = 9;
        assert_eq!(
            committee.combine(&hasher, &ct, &[share, stray]),
            Err(ThresholdError::UnknownMember(9))
        );
    }

    #[test]
    fn test_reconstructed_key_matches_election_key() {
        let (committee, locals, mut rng) = committee(2, 3, 8);
        let hasher = PoseidonHasher::new();
        let ct = ElGamalCiphertext::encrypt(4, &committee.election_key, &mut rng).unwrap();

        let shares: Vec<Share> = locals.iter().map(|m| m.share.clone()).collect();
        let sk = crate::shares::reconstruct_secret(&shares, 2).unwrap();
        assert_eq!(derive_public_key(&sk), committee.election_key);

        let dshares: Vec<_> = locals[1..]
            .iter()
            .map(|m| m.decryption_share(&hasher, &ct, &mut rng))
            .collect();
        assert_eq!(
            committee.decrypt_to_point(&hasher, &ct, &dshares).unwrap(),
            decrypt_to_point(&sk, &ct)
        );
    }
}
