//! Batch attestation bundles
//!
//! A `BatchAttestation` is what the proof service returns for one batch
//! window: the included deposit records in batch order plus the root the
//! source chain committed for that window.

use lockbridge_primitives::{Address, DepositRecord, B256};
use serde::{Deserialize, Serialize};

use crate::committed::CommittedRoot;
use crate::error::{AttestError, AttestResult};
use crate::tree::{DepositMerkleTree, MAX_DEPTH};
use crate::witness::MerkleWitness;

/// Inclusive source-chain block range processed by one pipeline job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchWindow {
    pub input_block_number: u64,
    pub output_block_number: u64,
}

impl BatchWindow {
    pub fn new(input_block_number: u64, output_block_number: u64) -> Self {
        Self {
            input_block_number,
            output_block_number,
        }
    }

    pub fn contains(&self, block_number: u64) -> bool {
        (self.input_block_number..=self.output_block_number).contains(&block_number)
    }
}

/// Deposits included in one finalized batch, with the committed root
#[derive(Debug, Clone)]
pub struct BatchAttestation {
    pub window: BatchWindow,
    pub records: Vec<DepositRecord>,
    pub committed_root: CommittedRoot,
}

impl BatchAttestation {
    pub fn new(
        window: BatchWindow,
        records: Vec<DepositRecord>,
        committed_root: CommittedRoot,
    ) -> Self {
        Self {
            window,
            records,
            committed_root,
        }
    }

    /// Index of the deposit keyed by (address, challenge)
    pub fn locate(&self, address: Address, challenge: B256) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.source_address == address && r.attestation_hash == challenge)
    }

    /// Build the tree and check it against the committed root
    pub fn tree(&self) -> AttestResult<DepositMerkleTree> {
        let tree = DepositMerkleTree::from_records(self.records.clone())?;
        self.committed_root.check(tree.root())?;
        Ok(tree)
    }

    /// Circuit-ready witness (padded to `MAX_DEPTH`) for one deposit
    pub fn attest(&self, address: Address, challenge: B256) -> AttestResult<MerkleWitness> {
        let index = self
            .locate(address, challenge)
            .ok_or_else(|| AttestError::DepositNotFound {
                address: address.to_string(),
                challenge: challenge.to_string(),
            })?;
        let witness = self.tree()?.witness(index)?.pad_to(MAX_DEPTH);
        witness.verify()?;
        Ok(witness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockbridge_primitives::{felt_from_u64, U256};

    fn create_test_records(n: usize) -> Vec<DepositRecord> {
        (0..n)
            .map(|i| {
                DepositRecord::new(
                    Address::with_last_byte(i as u8 + 1),
                    B256::with_last_byte(i as u8 + 50),
                    U256::from(1_000_000u64 * (i as u64 + 1)),
                )
            })
            .collect()
    }

    fn create_attestation(n: usize) -> BatchAttestation {
        let records = create_test_records(n);
        let root = DepositMerkleTree::from_records(records.clone())
            .unwrap()
            .root();
        BatchAttestation::new(BatchWindow::new(120, 180), records, CommittedRoot::new(root))
    }

    #[test]
    fn test_window_contains() {
        let window = BatchWindow::new(120, 180);
        assert!(window.contains(120));
        assert!(window.contains(150));
        assert!(window.contains(180));
        assert!(!window.contains(119));
        assert!(!window.contains(181));
    }

    #[test]
    fn test_locate_and_attest() {
        let attestation = create_attestation(3);
        let target = attestation.records[2];

        assert_eq!(
            attestation.locate(target.source_address, target.attestation_hash),
            Some(2)
        );

        let witness = attestation
            .attest(target.source_address, target.attestation_hash)
            .unwrap();
        assert_eq!(witness.leaf_index, 2);
        assert_eq!(witness.path.len(), MAX_DEPTH);
        assert_eq!(witness.leaf_value, target);
    }

    #[test]
    fn test_attest_missing_deposit() {
        let attestation = create_attestation(2);
        let err = attestation
            .attest(Address::repeat_byte(0xEE), B256::ZERO)
            .unwrap_err();
        assert!(matches!(err, AttestError::DepositNotFound { .. }));
    }

    #[test]
    fn test_attest_with_wrong_committed_root() {
        let mut attestation = create_attestation(2);
        attestation.committed_root = CommittedRoot::new(felt_from_u64(99));
        let target = attestation.records[0];
        let err = attestation
            .attest(target.source_address, target.attestation_hash)
            .unwrap_err();
        assert!(matches!(err, AttestError::CommittedRootMismatch { .. }));
    }
}
