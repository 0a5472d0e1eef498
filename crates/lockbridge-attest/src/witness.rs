//! Merkle inclusion witnesses
//!
//! A witness carries the leaf record itself, the bottom-up sibling path and
//! the root it claims. Bit `i` of the leaf index selects operand order at
//! level `i`: 0 means the running hash is the left child.
//!
//! The attestation circuit takes a path of exactly `MAX_DEPTH` entries.
//! [`MerkleWitness::pad_to`] appends dummy entries that verification skips.

use lockbridge_primitives::field::felt_serde;
use lockbridge_primitives::{felt_to_hex, hash_pair, DepositRecord, Felt, FELT_ZERO};
use serde::{Deserialize, Serialize};

use crate::error::{AttestError, AttestResult};
use crate::tree::MAX_DEPTH;

/// One level of a witness path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathElement {
    /// Sibling node at this level
    #[serde(with = "felt_serde")]
    pub sibling: Felt,

    /// Padding level above the tree; passes the running hash through
    pub is_dummy: bool,
}

impl PathElement {
    pub fn real(sibling: Felt) -> Self {
        Self {
            sibling,
            is_dummy: false,
        }
    }

    pub fn dummy() -> Self {
        Self {
            sibling: FELT_ZERO,
            is_dummy: true,
        }
    }
}

/// Inclusion witness for one deposit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleWitness {
    /// Root the witness claims
    #[serde(with = "felt_serde")]
    pub root_hash: Felt,

    /// Sibling path, leaf level first
    pub path: Vec<PathElement>,

    /// Position of the leaf in the batch
    pub leaf_index: u64,

    /// The deposit being attested
    pub leaf_value: DepositRecord,
}

impl MerkleWitness {
    /// Number of non-dummy levels
    pub fn real_depth(&self) -> usize {
        self.path.iter().filter(|p| !p.is_dummy).count()
    }

    /// Append dummy levels until the path has `depth` entries
    pub fn pad_to(mut self, depth: usize) -> Self {
        while self.path.len() < depth {
            self.path.push(PathElement::dummy());
        }
        self
    }

    /// Fold the leaf through the path and check the result against `root_hash`.
    ///
    /// Returns the computed root on success.
    pub fn verify(&self) -> AttestResult<Felt> {
        if self.path.len() > MAX_DEPTH {
            return Err(AttestError::invalid_witness(format!(
                "path length {} exceeds maximum depth {}",
                self.path.len(),
                MAX_DEPTH
            )));
        }

        let real_depth = self.real_depth();
        if self.path[..real_depth].iter().any(|p| p.is_dummy) {
            return Err(AttestError::invalid_witness(
                "dummy level below a real level",
            ));
        }
        if self.leaf_index >> real_depth != 0 {
            return Err(AttestError::invalid_witness(format!(
                "leaf index {} does not fit a tree of depth {}",
                self.leaf_index, real_depth
            )));
        }

        let mut current = self.leaf_value.leaf_hash();
        for (level, element) in self.path.iter().enumerate() {
            if element.is_dummy {
                continue;
            }
            current = if (self.leaf_index >> level) & 1 == 0 {
                hash_pair(current, element.sibling)
            } else {
                hash_pair(element.sibling, current)
            };
        }

        if current != self.root_hash {
            return Err(AttestError::RootMismatch {
                expected: felt_to_hex(&self.root_hash),
                actual: felt_to_hex(&current),
            });
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::DepositMerkleTree;
    use lockbridge_primitives::{Address, B256, U256};

    fn create_test_record(index: usize) -> DepositRecord {
        DepositRecord::new(
            Address::with_last_byte(index as u8 + 1),
            B256::repeat_byte(index as u8),
            U256::from(2_000_000u64),
        )
    }

    fn witness_for(n: usize, index: usize) -> MerkleWitness {
        let records = (0..n).map(create_test_record).collect();
        DepositMerkleTree::from_records(records)
            .unwrap()
            .witness(index)
            .unwrap()
    }

    #[test]
    fn test_padded_witness_still_verifies() {
        let witness = witness_for(5, 3);
        let root = witness.verify().unwrap();

        let padded = witness.pad_to(MAX_DEPTH);
        assert_eq!(padded.path.len(), MAX_DEPTH);
        assert_eq!(padded.real_depth(), 3);
        assert_eq!(padded.verify().unwrap(), root);
    }

    #[test]
    fn test_mutated_record_fails() {
        let mut witness = witness_for(4, 2);
        witness.leaf_value.source_address.0[0] ^= 0x01;
        assert!(matches!(
            witness.verify(),
            Err(AttestError::RootMismatch { .. })
        ));
    }

    #[test]
    fn test_mutated_sibling_fails() {
        let mut witness = witness_for(4, 1);
        witness.path[1].sibling = FELT_ZERO;
        assert!(witness.verify().is_err());
    }

    #[test]
    fn test_wrong_index_fails() {
        let mut witness = witness_for(4, 1);
        witness.leaf_index = 2;
        assert!(witness.verify().is_err());
    }

    #[test]
    fn test_index_beyond_depth_rejected() {
        let mut witness = witness_for(4, 1);
        witness.leaf_index = 1 | (1 << 2);
        assert!(matches!(
            witness.verify(),
            Err(AttestError::InvalidWitness(_))
        ));
    }

    #[test]
    fn test_dummy_below_real_rejected() {
        let mut witness = witness_for(4, 0);
        witness.path.insert(0, PathElement::dummy());
        assert!(matches!(
            witness.verify(),
            Err(AttestError::InvalidWitness(_))
        ));
    }

    #[test]
    fn test_overlong_path_rejected() {
        let witness = witness_for(2, 0).pad_to(MAX_DEPTH + 1);
        assert!(matches!(
            witness.verify(),
            Err(AttestError::InvalidWitness(_))
        ));
    }

    #[test]
    fn test_json_field_names() {
        let witness = witness_for(2, 1).pad_to(4);
        let json = serde_json::to_value(&witness).unwrap();
        assert!(json.get("rootHash").is_some());
        assert_eq!(json["leafIndex"], 1);
        assert_eq!(json["path"][3]["isDummy"], true);
    }
}
