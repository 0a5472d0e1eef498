//! Witness serialization
//!
//! Witnesses are cached between the attestation and mint steps, so they have
//! a versioned envelope with a JSON form (for inspection and the deposit
//! cache) and a compact binary form (for the proving worker).
//!
//! Binary layout:
//!
//! ```text
//! version        1 byte
//! leaf_index     8 bytes, big-endian
//! root_hash     32 bytes, little-endian field repr
//! leaf_value    84 bytes (address | attestation hash | value)
//! path_len       1 byte
//! path_len * (is_dummy 1 byte | sibling 32 bytes)
//! ```

use lockbridge_primitives::{
    felt_from_le_bytes, felt_to_le_bytes, DepositRecord, DEPOSIT_RECORD_LEN,
};
use serde::{Deserialize, Serialize};

use crate::error::AttestError;
use crate::tree::MAX_DEPTH;
use crate::witness::{MerkleWitness, PathElement};

const HEADER_LEN: usize = 1 + 8 + 32 + DEPOSIT_RECORD_LEN + 1;
const PATH_ENTRY_LEN: usize = 1 + 32;

/// Versioned witness envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableWitness {
    /// Protocol version
    pub version: u8,

    pub witness: MerkleWitness,
}

impl SerializableWitness {
    /// Current protocol version
    pub const VERSION: u8 = 1;

    pub fn new(witness: MerkleWitness) -> Self {
        Self {
            version: Self::VERSION,
            witness,
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, AttestError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AttestError::SerializationFailed(format!("JSON error: {}", e)))
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self, AttestError> {
        let parsed: Self = serde_json::from_str(json)
            .map_err(|e| AttestError::DeserializationFailed(format!("JSON error: {}", e)))?;
        if parsed.version != Self::VERSION {
            return Err(AttestError::DeserializationFailed(format!(
                "Unsupported version: {}",
                parsed.version
            )));
        }
        Ok(parsed)
    }

    /// Serialize to compact binary format
    pub fn to_bytes(&self) -> Result<Vec<u8>, AttestError> {
        let path = &self.witness.path;
        if path.len() > MAX_DEPTH {
            return Err(AttestError::SerializationFailed(format!(
                "path length {} exceeds maximum depth {}",
                path.len(),
                MAX_DEPTH
            )));
        }

        let mut bytes = Vec::with_capacity(HEADER_LEN + path.len() * PATH_ENTRY_LEN);
        bytes.push(self.version);
        bytes.extend_from_slice(&self.witness.leaf_index.to_be_bytes());
        bytes.extend_from_slice(&felt_to_le_bytes(&self.witness.root_hash));
        bytes.extend_from_slice(&self.witness.leaf_value.to_bytes());
        bytes.push(path.len() as u8);
        for element in path {
            bytes.push(element.is_dummy as u8);
            bytes.extend_from_slice(&felt_to_le_bytes(&element.sibling));
        }
        Ok(bytes)
    }

    /// Deserialize from compact binary format
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AttestError> {
        if bytes.len() < HEADER_LEN {
            return Err(AttestError::DeserializationFailed(
                "Input too short".to_string(),
            ));
        }

        let version = bytes[0];
        if version != Self::VERSION {
            return Err(AttestError::DeserializationFailed(format!(
                "Unsupported version: {}",
                version
            )));
        }
        let mut pos = 1;

        let mut index_bytes = [0u8; 8];
        index_bytes.copy_from_slice(&bytes[pos..pos + 8]);
        let leaf_index = u64::from_be_bytes(index_bytes);
        pos += 8;

        let root_hash = felt_from_le_bytes(&read_32(bytes, pos))?;
        pos += 32;

        let mut record_bytes = [0u8; DEPOSIT_RECORD_LEN];
        record_bytes.copy_from_slice(&bytes[pos..pos + DEPOSIT_RECORD_LEN]);
        let leaf_value = DepositRecord::from_bytes(&record_bytes);
        pos += DEPOSIT_RECORD_LEN;

        let path_len = bytes[pos] as usize;
        pos += 1;
        if path_len > MAX_DEPTH {
            return Err(AttestError::DeserializationFailed(format!(
                "path length {} exceeds maximum depth {}",
                path_len, MAX_DEPTH
            )));
        }
        if bytes.len() != pos + path_len * PATH_ENTRY_LEN {
            return Err(AttestError::DeserializationFailed(format!(
                "expected {} bytes, got {}",
                pos + path_len * PATH_ENTRY_LEN,
                bytes.len()
            )));
        }

        let mut path = Vec::with_capacity(path_len);
        for _ in 0..path_len {
            let is_dummy = match bytes[pos] {
                0 => false,
                1 => true,
                other => {
                    return Err(AttestError::DeserializationFailed(format!(
                        "invalid dummy flag {}",
                        other
                    )))
                }
            };
            let sibling = felt_from_le_bytes(&read_32(bytes, pos + 1))?;
            path.push(PathElement { sibling, is_dummy });
            pos += PATH_ENTRY_LEN;
        }

        Ok(Self {
            version,
            witness: MerkleWitness {
                root_hash,
                path,
                leaf_index,
                leaf_value,
            },
        })
    }
}

fn read_32(bytes: &[u8], pos: usize) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes[pos..pos + 32]);
    out
}
