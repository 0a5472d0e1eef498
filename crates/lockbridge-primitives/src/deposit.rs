//! Deposit records and leaf packing
//!
//! A deposit record is 84 bytes: a 20-byte source address, a 32-byte
//! attestation hash (the identity challenge) and a 32-byte big-endian value.
//! It is packed into three 32-byte buffers, each with a zero top byte:
//!
//! ```text
//! A = address[0..20] | attestationHash[0] | lockedValue[0] | 0x00 * 10
//! B = attestationHash[1..32] | 0x00
//! C = lockedValue[1..32]     | 0x00
//! ```
//!
//! Each buffer is read as a little-endian field element and the leaf is the
//! Poseidon hash of the three.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::field::{felt_from_le_slice, Felt, SAFE_BYTES};
use crate::poseidon::poseidon_hash;

/// Smallest lockable unit in wei (10^6)
pub const MIN_LOCK_UNIT: u64 = 1_000_000;

/// Serialized size of a deposit record
pub const DEPOSIT_RECORD_LEN: usize = 20 + 32 + 32;

/// One lock observed on the source chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRecord {
    /// Depositor on the source chain
    pub source_address: Address,

    /// Identity challenge the deposit is bound to
    pub attestation_hash: B256,

    /// Total value locked under (address, challenge)
    pub locked_value: U256,
}

/// The three packed buffers of a deposit record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedDeposit {
    pub a: [u8; 32],
    pub b: [u8; 32],
    pub c: [u8; 32],
}

impl PackedDeposit {
    /// Read each buffer as a little-endian field element.
    ///
    /// The top byte of every buffer is zero, so no reduction happens.
    pub fn to_fields(&self) -> [Felt; 3] {
        [
            felt_from_le_slice(&self.a[..SAFE_BYTES]),
            felt_from_le_slice(&self.b[..SAFE_BYTES]),
            felt_from_le_slice(&self.c[..SAFE_BYTES]),
        ]
    }
}

impl DepositRecord {
    pub fn new(source_address: Address, attestation_hash: B256, locked_value: U256) -> Self {
        Self {
            source_address,
            attestation_hash,
            locked_value,
        }
    }

    /// Big-endian 32-byte value
    pub fn value_bytes(&self) -> [u8; 32] {
        self.locked_value.to_be_bytes::<32>()
    }

    /// Raw 84-byte encoding (address, hash, value)
    pub fn to_bytes(&self) -> [u8; DEPOSIT_RECORD_LEN] {
        let mut out = [0u8; DEPOSIT_RECORD_LEN];
        out[..20].copy_from_slice(self.source_address.as_slice());
        out[20..52].copy_from_slice(self.attestation_hash.as_slice());
        out[52..].copy_from_slice(&self.value_bytes());
        out
    }

    /// Inverse of [`DepositRecord::to_bytes`]
    pub fn from_bytes(bytes: &[u8; DEPOSIT_RECORD_LEN]) -> Self {
        Self {
            source_address: Address::from_slice(&bytes[..20]),
            attestation_hash: B256::from_slice(&bytes[20..52]),
            locked_value: U256::from_be_slice(&bytes[52..]),
        }
    }

    pub fn pack(&self) -> PackedDeposit {
        let hash = self.attestation_hash.0;
        let value = self.value_bytes();

        let mut a = [0u8; 32];
        a[..20].copy_from_slice(self.source_address.as_slice());
        a[20] = hash[0];
        a[21] = value[0];

        let mut b = [0u8; 32];
        b[..31].copy_from_slice(&hash[1..]);

        let mut c = [0u8; 32];
        c[..31].copy_from_slice(&value[1..]);

        PackedDeposit { a, b, c }
    }

    /// Leaf hash of this record
    pub fn leaf_hash(&self) -> Felt {
        poseidon_hash(self.pack().to_fields())
    }
}

/// Check a lock value against the unit rules: non-zero and a whole multiple of `unit`
pub fn is_valid_lock_value(value: U256, unit: U256) -> bool {
    !value.is_zero() && !unit.is_zero() && (value % unit).is_zero()
}
