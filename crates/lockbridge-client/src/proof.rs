//! Proof/attestation service
//!
//! Resolves a deposit block to its batch and builds the inclusion witness.
//! Tree construction is CPU-bound, so it runs on the blocking pool with the
//! batch moved in and the witness moved out.

use std::sync::Arc;

use async_trait::async_trait;
use lockbridge_attest::{BatchAttestation, BatchWindow, MerkleWitness, RootByteOrder};
use lockbridge_primitives::{Address, B256};
use tracing::{debug, info};

use crate::client::BridgeClient;
use crate::error::{ClientError, Result};

/// Inclusion witness plus the batch window whose committed root it folds to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestedDeposit {
    pub window: BatchWindow,
    pub witness: MerkleWitness,
}

#[async_trait]
pub trait ProofService: Send + Sync {
    /// Batch (deposits plus committed root) that processed `block`
    async fn batch_for_block(&self, block: u64) -> Result<BatchAttestation>;

    /// Circuit-ready witness for the deposit keyed by (address, challenge)
    async fn attest(
        &self,
        block: u64,
        address: Address,
        challenge: B256,
    ) -> Result<AttestedDeposit> {
        let batch = self.batch_for_block(block).await?;
        if !batch.window.contains(block) {
            return Err(ClientError::WindowMismatch {
                block,
                input: batch.window.input_block_number,
                output: batch.window.output_block_number,
            });
        }
        debug!(block, deposits = batch.records.len(), "building attestation witness");
        let window = batch.window;

        let witness = tokio::task::spawn_blocking(move || batch.attest(address, challenge))
            .await
            .map_err(|e| ClientError::ProofTask(e.to_string()))??;

        info!(block, leaf_index = witness.leaf_index, "attestation witness ready");
        Ok(AttestedDeposit { window, witness })
    }
}

/// Proof service backed by the bridge HTTP API
#[derive(Debug, Clone)]
pub struct HttpProofService {
    client: Arc<BridgeClient>,
    root_byte_order: RootByteOrder,
}

impl HttpProofService {
    pub fn new(client: Arc<BridgeClient>, root_byte_order: RootByteOrder) -> Self {
        Self {
            client,
            root_byte_order,
        }
    }
}

#[async_trait]
impl ProofService for HttpProofService {
    async fn batch_for_block(&self, block: u64) -> Result<BatchAttestation> {
        self.client
            .get_batch_deposits(block)
            .await?
            .into_attestation(self.root_byte_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::types::BatchDepositsResponse;
    use httpmock::prelude::*;
    use lockbridge_attest::{AttestError, BatchWindow, CommittedRoot, DepositMerkleTree};
    use lockbridge_primitives::{DepositRecord, U256};

    fn records() -> Vec<DepositRecord> {
        (1..=5u8)
            .map(|i| {
                DepositRecord::new(
                    Address::with_last_byte(i),
                    B256::with_last_byte(i + 100),
                    U256::from(i as u64 * 1_000_000),
                )
            })
            .collect()
    }

    fn service_for(server: &MockServer) -> HttpProofService {
        let config = ClientConfig::local().with_base_url(server.base_url());
        let client = Arc::new(BridgeClient::try_new(&config).unwrap());
        HttpProofService::new(client, config.root_byte_order)
    }

    fn mock_batch(server: &MockServer, committed_root: String) {
        let response = BatchDepositsResponse {
            window: BatchWindow::new(120, 180),
            deposits: records(),
            committed_root,
        };
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/batches/150/deposits");
            then.status(200)
                .json_body(serde_json::to_value(&response).unwrap());
        });
    }

    #[tokio::test]
    async fn test_attest_over_http() {
        let server = MockServer::start();
        let root = DepositMerkleTree::from_records(records()).unwrap().root();
        mock_batch(&server, CommittedRoot::new(root).to_hex(RootByteOrder::Canonical));

        let attested = service_for(&server)
            .attest(150, Address::with_last_byte(3), B256::with_last_byte(103))
            .await
            .unwrap();
        assert_eq!(attested.window, BatchWindow::new(120, 180));
        assert_eq!(attested.witness.leaf_index, 2);
        assert_eq!(attested.witness.verify().unwrap(), root);
    }

    #[tokio::test]
    async fn test_attest_rejects_wrong_committed_root() {
        let server = MockServer::start();
        mock_batch(
            &server,
            CommittedRoot::new(lockbridge_primitives::felt_from_u64(9))
                .to_hex(RootByteOrder::Canonical),
        );

        let result = service_for(&server)
            .attest(150, Address::with_last_byte(3), B256::with_last_byte(103))
            .await;
        assert!(matches!(
            result,
            Err(ClientError::Attest(AttestError::CommittedRootMismatch { .. }))
        ));
    }

    #[tokio::test]
    async fn test_attest_unknown_deposit() {
        let server = MockServer::start();
        let root = DepositMerkleTree::from_records(records()).unwrap().root();
        mock_batch(&server, CommittedRoot::new(root).to_hex(RootByteOrder::Canonical));

        let result = service_for(&server)
            .attest(150, Address::with_last_byte(3), B256::with_last_byte(104))
            .await;
        assert!(matches!(
            result,
            Err(ClientError::Attest(AttestError::DepositNotFound { .. }))
        ));
    }

    struct FixedBatch(BatchAttestation);

    #[async_trait]
    impl ProofService for FixedBatch {
        async fn batch_for_block(&self, _block: u64) -> Result<BatchAttestation> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_attest_checks_window() {
        let root = DepositMerkleTree::from_records(records()).unwrap().root();
        let service = FixedBatch(BatchAttestation::new(
            BatchWindow::new(120, 180),
            records(),
            CommittedRoot::new(root),
        ));
        let result = service
            .attest(181, Address::with_last_byte(1), B256::with_last_byte(101))
            .await;
        assert!(matches!(
            result,
            Err(ClientError::WindowMismatch { block: 181, .. })
        ));
    }
}
