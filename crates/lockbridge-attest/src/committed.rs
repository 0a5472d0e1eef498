//! Batch roots committed on the source chain
//!
//! The consensus/inclusion proof for a batch window carries the batch root as
//! 32 bytes. Two byte orders are in circulation:
//! - `Canonical`: the little-endian field representation (default)
//! - `LegacyReversed`: the same bytes reversed (big-endian integer)

use lockbridge_primitives::{felt_from_le_bytes, felt_to_hex, felt_to_le_bytes, Felt};
use serde::{Deserialize, Serialize};

use crate::error::{AttestError, AttestResult};

/// Byte order of a committed root on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RootByteOrder {
    #[default]
    Canonical,
    LegacyReversed,
}

/// A batch root as committed by the source chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommittedRoot(Felt);

impl CommittedRoot {
    pub fn new(root: Felt) -> Self {
        Self(root)
    }

    pub fn root(&self) -> Felt {
        self.0
    }

    pub fn from_bytes(bytes: [u8; 32], order: RootByteOrder) -> AttestResult<Self> {
        let mut le = bytes;
        if order == RootByteOrder::LegacyReversed {
            le.reverse();
        }
        let root = felt_from_le_bytes(&le).map_err(|e| AttestError::InvalidRoot(e.to_string()))?;
        Ok(Self(root))
    }

    /// Parse a `0x` prefixed (or bare) 32-byte hex string
    pub fn from_hex(value: &str, order: RootByteOrder) -> AttestResult<Self> {
        let stripped = value.strip_prefix("0x").unwrap_or(value);
        let decoded =
            hex::decode(stripped).map_err(|e| AttestError::InvalidRoot(e.to_string()))?;
        let bytes: [u8; 32] = decoded.as_slice().try_into().map_err(|_| {
            AttestError::InvalidRoot(format!("expected 32 bytes, got {}", decoded.len()))
        })?;
        Self::from_bytes(bytes, order)
    }

    pub fn to_bytes(&self, order: RootByteOrder) -> [u8; 32] {
        let mut bytes = felt_to_le_bytes(&self.0);
        if order == RootByteOrder::LegacyReversed {
            bytes.reverse();
        }
        bytes
    }

    pub fn to_hex(&self, order: RootByteOrder) -> String {
        format!("0x{}", hex::encode(self.to_bytes(order)))
    }

    /// Require `computed` to equal the committed root
    pub fn check(&self, computed: Felt) -> AttestResult<()> {
        if computed != self.0 {
            return Err(AttestError::CommittedRootMismatch {
                committed: felt_to_hex(&self.0),
                computed: felt_to_hex(&computed),
            });
        }
        Ok(())
    }
}
