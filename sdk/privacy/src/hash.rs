//! Domain-Separated Poseidon
//!
//! Every protocol hash is a Poseidon sponge over BN254 `Fr`, prefixed with a
//! one-byte domain constant:
//!
//! ```text
//! H_domain(x_1, ..., x_n) = Poseidon(domain, x_1, ..., x_n)
//! ```
//!
//! Generating the round constants and MDS matrix runs the Grain LFSR, which is
//! slow enough that the parameters are built once and shared. Callers hold a
//! [`PoseidonHasher`] and pass it by reference; [`PoseidonHasher::init`] and
//! [`PoseidonHasher::global`] provide a process-wide instance on top of that.

use std::sync::OnceLock;

use ark_crypto_primitives::sponge::{
    CryptographicSponge, FieldBasedCryptographicSponge,
    poseidon::{PoseidonConfig, PoseidonSponge, find_poseidon_ark_and_mds},
};
use ark_ff::PrimeField;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{PrivacyError, PrivacyResult};
use crate::field::Fr;

static GLOBAL_HASHER: OnceLock<PoseidonHasher> = OnceLock::new();

/// Hash domains. Each purpose owns exactly one tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Domain {
    NoteCommitment = 0x01,
    SpendNullifier = 0x02,
    ActionNullifier = 0x03,
    NullifierKey = 0x04,
    StealthFactor = 0x05,
    MerkleNode = 0x06,
    EmptyLeaf = 0x07,
}

impl Domain {
    pub const ALL: [Domain; 7] = [
        Domain::NoteCommitment,
        Domain::SpendNullifier,
        Domain::ActionNullifier,
        Domain::NullifierKey,
        Domain::StealthFactor,
        Domain::MerkleNode,
        Domain::EmptyLeaf,
    ];

    pub const fn tag(self) -> u8 {
        self as u8
    }

    pub fn to_field(self) -> Fr {
        Fr::from(self.tag())
    }
}

/// Poseidon parameters.
///
/// Defaults: rate 2, capacity 1, 8 full rounds, 57 partial rounds, x^5 S-box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashConfig {
    pub rate: usize,
    pub full_rounds: u64,
    pub partial_rounds: u64,
    pub alpha: u64,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            rate: 2,
            full_rounds: 8,
            partial_rounds: 57,
            alpha: 5,
        }
    }
}

/// Poseidon hash context
#[derive(Clone)]
pub struct PoseidonHasher {
    config: PoseidonConfig<Fr>,
}

impl PoseidonHasher {
    /// Build a hasher with the default parameters
    pub fn new() -> Self {
        Self::with_config(&HashConfig::default())
    }

    /// Build a hasher with explicit parameters
    pub fn with_config(params: &HashConfig) -> Self {
        let (ark, mds) = find_poseidon_ark_and_mds::<Fr>(
            Fr::MODULUS_BIT_SIZE as u64,
            params.rate,
            params.full_rounds,
            params.partial_rounds,
            0,
        );
        debug!(
            "poseidon parameters generated: rate={} rf={} rp={}",
            params.rate, params.full_rounds, params.partial_rounds
        );

        Self {
            config: PoseidonConfig::new(
                params.full_rounds as usize,
                params.partial_rounds as usize,
                params.alpha,
                mds,
                ark,
                params.rate,
                1,
            ),
        }
    }

    /// Initialize the process-wide hasher.
    ///
    /// Concurrent callers block on the same build; the parameters are generated once.
    pub fn init() -> &'static PoseidonHasher {
        GLOBAL_HASHER.get_or_init(PoseidonHasher::new)
    }

    /// The process-wide hasher, if [`PoseidonHasher::init`] has completed.
    pub fn global() -> PrivacyResult<&'static PoseidonHasher> {
        GLOBAL_HASHER.get().ok_or(PrivacyError::HashNotInitialized)
    }

    /// Hash field elements, optionally prefixed by a domain separator
    pub fn hash(&self, inputs: &[Fr], domain: Option<Domain>) -> Fr {
        let mut sponge = PoseidonSponge::new(&self.config);

        if let Some(domain) = domain {
            sponge.absorb(&domain.to_field());
        }
        sponge.absorb(&inputs);

        sponge.squeeze_native_field_elements(1)[0]
    }

    /// `H_domain(inputs)`
    pub fn hash_with(&self, domain: Domain, inputs: &[Fr]) -> Fr {
        self.hash(inputs, Some(domain))
    }

    /// Two-to-one node hash for the external commitment accumulator
    pub fn hash_merkle_node(&self, left: &Fr, right: &Fr) -> Fr {
        self.hash_with(Domain::MerkleNode, &[*left, *right])
    }
}

impl Default for PoseidonHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PoseidonHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseidonHasher")
            .field("rate", &self.config.rate)
            .field("full_rounds", &self.config.full_rounds)
            .field("partial_rounds", &self.config.partial_rounds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::field_to_bytes;
    use std::collections::HashSet;

    #[test]
    fn test_domains_are_distinct() {
        let tags: HashSet<u8> = Domain::ALL.iter().map(|d| d.tag()).collect();
        assert_eq!(tags.len(), Domain::ALL.len());
    }

    #[test]
    fn test_known_vector() {
        let hasher = PoseidonHasher::new();
        let out = hasher.hash(&[Fr::from(1u64), Fr::from(2u64)], None);
        assert_eq!(
            hex::encode(field_to_bytes(&out)),
            "0fca49b798923ab0239de1c9e7a4a9a2210312b6a2f616d18b5a87f9b628ae29"
        );
    }

    #[test]
    fn test_domain_is_prepended() {
        let hasher = PoseidonHasher::new();
        let inputs = [Fr::from(5u64), Fr::from(6u64)];

        let with_domain = hasher.hash_with(Domain::NoteCommitment, &inputs);
        let manual = hasher.hash(
            &[Domain::NoteCommitment.to_field(), inputs[0], inputs[1]],
            None,
        );
        assert_eq!(with_domain, manual);
        assert_ne!(with_domain, hasher.hash(&inputs, None));
    }

    #[test]
    fn test_domains_separate_outputs() {
        let hasher = PoseidonHasher::new();
        let inputs = [Fr::from(9u64), Fr::from(10u64), Fr::from(11u64)];

        let outputs: HashSet<[u8; 32]> = Domain::ALL
            .iter()
            .map(|d| field_to_bytes(&hasher.hash_with(*d, &inputs)))
            .collect();
        assert_eq!(outputs.len(), Domain::ALL.len());
    }

    #[test]
    fn test_merkle_node_uses_node_domain() {
        let hasher = PoseidonHasher::new();
        let (l, r) = (Fr::from(1u64), Fr::from(2u64));

        assert_eq!(
            hasher.hash_merkle_node(&l, &r),
            hasher.hash_with(Domain::MerkleNode, &[l, r])
        );
        assert_ne!(hasher.hash_merkle_node(&l, &r), hasher.hash_merkle_node(&r, &l));
    }

    #[test]
    fn test_global_init_is_shared() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| PoseidonHasher::init() as *const PoseidonHasher as usize))
            .collect();
        let addrs: HashSet<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(addrs.len(), 1);
        assert!(PoseidonHasher::global().is_ok());
    }
}
