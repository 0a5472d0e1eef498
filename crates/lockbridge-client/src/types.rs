//! Type definitions for the bridge API

use lockbridge_attest::{BatchAttestation, BatchWindow, CommittedRoot, RootByteOrder};
use lockbridge_primitives::DepositRecord;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Response of `GET /api/v1/batches/{block}/deposits`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDepositsResponse {
    pub window: BatchWindow,
    /// Deposit records in batch order
    pub deposits: Vec<DepositRecord>,
    /// Hex-encoded committed root, in the deployment's byte order
    pub committed_root: String,
}

impl BatchDepositsResponse {
    /// Decode the committed root and bundle the batch for attestation
    pub fn into_attestation(self, order: RootByteOrder) -> Result<BatchAttestation> {
        let committed_root = CommittedRoot::from_hex(&self.committed_root, order)?;
        Ok(BatchAttestation::new(
            self.window,
            self.deposits,
            committed_root,
        ))
    }
}
