//! Deposit Merkle tree
//!
//! - `DepositMerkleTree`: Poseidon Merkle tree over deposit leaves
//! - `zero_hash`: per-level sentinels for padded subtrees
//! - `depth_and_padding`: tree shape for a batch size

mod merkle;
mod zero;

pub use merkle::{build_leaves, build_witness, depth_and_padding, fold_root, DepositMerkleTree, MAX_DEPTH};
pub use zero::{zero_hash, zero_hashes};
