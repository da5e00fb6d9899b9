//! Merkle Hashing for Note Commitments
//!
//! The commitment accumulator lives outside this crate. These helpers hash
//! nodes the same way it does, so paths it hands out can be checked locally.
//!
//! ```text
//!                    Root
//!                   /    \
//!                 H01    H23          H = H_node(left, right)
//!                /  \   /   \
//!               C0  C1 C2   E         E = H_empty(0)
//! ```

use serde::{Deserialize, Serialize};

use crate::commitment::Commitment;
use crate::field::{Fr, bytes_to_field, field_to_bytes};
use crate::hash::{Domain, PoseidonHasher};

/// Accumulator depth
pub const TREE_DEPTH: usize = 32;

/// Authentication path for one commitment, as served by the accumulator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerklePath {
    /// Leaf level first
    pub siblings: Vec<[u8; 32]>,
    /// `true` where the running node is the right child
    pub path_bits: Vec<bool>,
    pub position: u64,
}

impl MerklePath {
    /// Path for `position` with bits taken from the index, leaf level first
    pub fn from_position(position: u64, siblings: Vec<[u8; 32]>) -> Self {
        let path_bits = (0..siblings.len()).map(|i| (position >> i) & 1 == 1).collect();
        Self {
            siblings,
            path_bits,
            position,
        }
    }

    /// Fold the path up from `leaf`
    pub fn compute_root(&self, hasher: &MerkleHasher<'_>, leaf: &Commitment) -> [u8; 32] {
        hasher.compute_root_from_path(leaf.as_bytes(), &self.siblings, &self.path_bits)
    }

    /// Verify that this path proves inclusion of `leaf` in `root`
    pub fn verify(&self, hasher: &MerkleHasher<'_>, leaf: &Commitment, root: &[u8; 32]) -> bool {
        self.siblings.len() == self.path_bits.len()
            && bytes_to_field::<Fr>(&self.compute_root(hasher, leaf)) == bytes_to_field::<Fr>(root)
    }

    /// Get the authentication path as field elements (for ZK circuits)
    pub fn to_field_elements(&self) -> Vec<Fr> {
        self.siblings.iter().map(bytes_to_field).collect()
    }
}

/// Poseidon-based Merkle hash function
pub struct MerkleHasher<'a> {
    hasher: &'a PoseidonHasher,
    /// Precomputed empty subtree roots at each level
    empty_roots: Vec<[u8; 32]>,
}

impl<'a> MerkleHasher<'a> {
    pub fn new(hasher: &'a PoseidonHasher) -> Self {
        let mut empty_roots = Vec::with_capacity(TREE_DEPTH + 1);
        let mut current = hasher.hash_with(Domain::EmptyLeaf, &[Fr::from(0u64)]);
        empty_roots.push(field_to_bytes(&current));

        for _ in 0..TREE_DEPTH {
            current = hasher.hash_merkle_node(&current, &current);
            empty_roots.push(field_to_bytes(&current));
        }

        Self {
            hasher,
            empty_roots,
        }
    }

    /// Hash two children to get parent
    pub fn hash_pair(&self, left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
        field_to_bytes(
            &self
                .hasher
                .hash_merkle_node(&bytes_to_field(left), &bytes_to_field(right)),
        )
    }

    /// Value of an unoccupied leaf
    pub fn empty_leaf(&self) -> &[u8; 32] {
        &self.empty_roots[0]
    }

    /// Root of an empty subtree of the given height, `None` above [`TREE_DEPTH`]
    pub fn empty_root(&self, depth: usize) -> Option<&[u8; 32]> {
        self.empty_roots.get(depth)
    }

    /// Fold `leaf` up through `siblings`; a set bit puts the running node on the right
    pub fn compute_root_from_path(
        &self,
        leaf: &[u8; 32],
        siblings: &[[u8; 32]],
        path_bits: &[bool],
    ) -> [u8; 32] {
        siblings
            .iter()
            .zip(path_bits)
            .fold(*leaf, |node, (sibling, &node_is_right)| match node_is_right {
                true => self.hash_pair(sibling, &node),
                false => self.hash_pair(&node, sibling),
            })
    }
}
