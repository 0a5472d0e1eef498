//! Lockbridge Primitives
//!
//! This crate provides the building blocks shared by the attestation, identity
//! binding and minting layers:
//! - Field arithmetic over the BN254 scalar field
//! - Poseidon hashing with the attestation circuit's parameters
//! - SHA-256 digests and their field mapping
//! - Deposit records and leaf packing

pub mod deposit;
pub mod error;
pub mod field;
pub mod hash;
pub mod poseidon;

pub use deposit::{
    is_valid_lock_value, DepositRecord, PackedDeposit, DEPOSIT_RECORD_LEN, MIN_LOCK_UNIT,
};
pub use error::{PrimitivesError, PrimitivesResult};
pub use field::{
    felt_from_hex, felt_from_le_bytes, felt_from_le_slice, felt_from_u64, felt_to_hex,
    felt_to_le_bytes, Felt, FELT_ONE, FELT_ZERO,
};
pub use hash::{digest_to_felt, sha256_with_domain};
pub use poseidon::{hash_pair, poseidon_hash};

pub use alloy_primitives::{Address, B256, U256};
