//! Poseidon Merkle tree over deposit records
//!
//! Leaves keep batch order. A level with an odd number of nodes is completed
//! with that level's zero sentinel, which is the same as padding the leaf
//! array to the next power of two with zero leaves.

use lockbridge_primitives::{hash_pair, DepositRecord, Felt};
use rayon::prelude::*;

use super::zero::zero_hash;
use crate::error::{AttestError, AttestResult};
use crate::witness::{MerkleWitness, PathElement};

/// Fixed path length of the attestation circuit (up to 65,536 leaves)
pub const MAX_DEPTH: usize = 16;

/// Smallest depth with `2^depth >= n`, and the padded leaf count
pub fn depth_and_padding(n: usize) -> AttestResult<(usize, usize)> {
    if n == 0 {
        return Err(AttestError::EmptyBatch);
    }
    let padded = n.next_power_of_two();
    let depth = padded.trailing_zeros() as usize;
    if depth > MAX_DEPTH {
        return Err(AttestError::BatchTooLarge {
            size: n,
            max: 1 << MAX_DEPTH,
        });
    }
    Ok((depth, padded))
}

/// Hash every record into its leaf, preserving order
pub fn build_leaves(records: &[DepositRecord]) -> Vec<Felt> {
    records.par_iter().map(DepositRecord::leaf_hash).collect()
}

/// Root of the tree over `leaves`
pub fn fold_root(leaves: &[Felt]) -> AttestResult<Felt> {
    let (depth, _) = depth_and_padding(leaves.len())?;
    let mut current = leaves.to_vec();
    for level in 0..depth {
        current = fold_level(&current, level);
    }
    Ok(current[0])
}

/// Build the tree over `records` and return the witness for one leaf
pub fn build_witness(records: &[DepositRecord], leaf_index: usize) -> AttestResult<MerkleWitness> {
    DepositMerkleTree::from_records(records.to_vec())?.witness(leaf_index)
}

fn fold_level(nodes: &[Felt], level: usize) -> Vec<Felt> {
    nodes
        .chunks(2)
        .map(|pair| {
            let right = pair.get(1).copied().unwrap_or_else(|| zero_hash(level));
            hash_pair(pair[0], right)
        })
        .collect()
}

/// Merkle tree over a batch of deposit records
#[derive(Debug, Clone)]
pub struct DepositMerkleTree {
    /// Records in batch order
    records: Vec<DepositRecord>,

    /// Node hashes by level (level 0 = leaves, last = root)
    levels: Vec<Vec<Felt>>,

    /// Number of levels above the leaves
    depth: usize,
}

impl DepositMerkleTree {
    /// Build a tree from deposit records
    pub fn from_records(records: Vec<DepositRecord>) -> AttestResult<Self> {
        let (depth, _) = depth_and_padding(records.len())?;

        let mut levels = Vec::with_capacity(depth + 1);
        levels.push(build_leaves(&records));
        for level in 0..depth {
            let next = fold_level(&levels[level], level);
            levels.push(next);
        }

        Ok(Self {
            records,
            levels,
            depth,
        })
    }

    /// Get the root hash
    pub fn root(&self) -> Felt {
        self.levels[self.depth][0]
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Get the number of leaves (excluding padding)
    pub fn num_leaves(&self) -> usize {
        self.records.len()
    }

    /// Leaf count including padding
    pub fn padded_size(&self) -> usize {
        1 << self.depth
    }

    pub fn records(&self) -> &[DepositRecord] {
        &self.records
    }

    /// Get all leaf hashes
    pub fn leaf_hashes(&self) -> &[Felt] {
        &self.levels[0]
    }

    /// Inclusion witness for the leaf at `leaf_index`.
    ///
    /// The path holds exactly `depth` real siblings, bottom-up. A sibling in
    /// the padded region is the zero sentinel of its level.
    pub fn witness(&self, leaf_index: usize) -> AttestResult<MerkleWitness> {
        if leaf_index >= self.records.len() {
            return Err(AttestError::LeafIndexOutOfBounds {
                index: leaf_index,
                len: self.records.len(),
            });
        }

        let mut path = Vec::with_capacity(self.depth);
        let mut index = leaf_index;
        for level in 0..self.depth {
            let sibling = self.levels[level]
                .get(index ^ 1)
                .copied()
                .unwrap_or_else(|| zero_hash(level));
            path.push(PathElement::real(sibling));
            index >>= 1;
        }

        Ok(MerkleWitness {
            root_hash: self.root(),
            path,
            leaf_index: leaf_index as u64,
            leaf_value: self.records[leaf_index],
        })
    }
}
