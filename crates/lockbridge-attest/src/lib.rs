//! Lockbridge Deposit Attestation
//!
//! This crate proves that a deposit record was included in a finalized batch.
//!
//! # Architecture
//!
//! - **Tree**: Poseidon Merkle tree over packed deposit leaves, padded with
//!   per-level zero sentinels up to `MAX_DEPTH`
//! - **Witness**: bottom-up sibling path with dummy levels for the fixed-depth circuit
//! - **Committed root**: the batch root published on the source chain, with its byte order
//! - **Batch attestation**: proof-service bundle used to locate and attest one deposit
//!
//! # Usage
//!
//! ```ignore
//! use lockbridge_attest::{BatchAttestation, BatchWindow, CommittedRoot, RootByteOrder};
//!
//! let committed = CommittedRoot::from_hex(&response.committed_root, RootByteOrder::Canonical)?;
//! let batch = BatchAttestation::new(window, response.deposits, committed);
//!
//! let witness = batch.attest(address, challenge)?;
//! assert_eq!(witness.verify()?, batch.committed_root.root());
//! ```

pub mod batch;
pub mod committed;
pub mod error;
pub mod serialization;
pub mod tree;
pub mod witness;

pub use batch::{BatchAttestation, BatchWindow};
pub use committed::{CommittedRoot, RootByteOrder};
pub use error::{AttestError, AttestResult};
pub use serialization::SerializableWitness;
pub use tree::{
    build_leaves, build_witness, depth_and_padding, fold_root, zero_hash, zero_hashes, DepositMerkleTree,
    MAX_DEPTH,
};
pub use witness::{MerkleWitness, PathElement};
