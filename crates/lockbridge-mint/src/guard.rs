//! Destination-side mint admission
//!
//! A mint is admitted only after, in order:
//! 1. the identity binding is for the requested recipient and recomputes to
//!    the challenge stored in the attested deposit record
//! 2. the Merkle witness verifies
//! 3. the witness root equals the root relayed into the ledger for the
//!    request's batch window
//! 4. the recipient's `minted_so_far` moves from its read value to the
//!    attested total in one compare-and-set
//!
//! The attested total is cumulative, so a receipt's `amount_minted` is the
//! difference between it and what was already minted.

use std::sync::Arc;

use lockbridge_attest::{BatchWindow, CommittedRoot, MerkleWitness};
use lockbridge_pkarm::{derive_challenge, CodeVerifier, RecipientIdentity};
use lockbridge_primitives::U256;
use lockbridge_readiness::{DepositReadiness, ReadinessStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::error::{MintError, MintResult};
use crate::ledger::MintLedger;

/// Everything the destination needs to admit one mint
#[derive(Debug, Clone)]
pub struct MintRequest {
    /// Account to credit
    pub recipient: RecipientIdentity,
    /// Secret half of the depositor's identity binding
    pub code_verifier: CodeVerifier,
    pub witness: MerkleWitness,
    /// Batch that included the deposit; selects the committed root
    pub window: BatchWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintReceipt {
    pub recipient: RecipientIdentity,
    pub amount_minted: U256,
    pub minted_so_far: U256,
}

#[derive(Debug)]
pub struct MintGuard<L> {
    ledger: Arc<L>,
}

impl<L> Clone for MintGuard<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<L: MintLedger> MintGuard<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// One-time storage setup for a recipient
    pub fn setup_storage(&self, recipient: &RecipientIdentity) -> MintResult<()> {
        self.ledger.setup(recipient)?;
        debug!(%recipient, "mint storage ready");
        Ok(())
    }

    /// Relay the consensus root for a batch window
    pub fn commit_root(&self, window: BatchWindow, root: CommittedRoot) -> MintResult<()> {
        self.ledger.commit_root(window, root)?;
        debug!(
            input = window.input_block_number,
            output = window.output_block_number,
            "batch root committed"
        );
        Ok(())
    }

    /// Admit or reject a mint
    pub fn mint(&self, request: &MintRequest) -> MintResult<MintReceipt> {
        let span = info_span!("mint", recipient = %request.recipient);
        let _enter = span.enter();

        let result = self.admit(request);
        match &result {
            Ok(receipt) => info!(
                amount = %receipt.amount_minted,
                minted_so_far = %receipt.minted_so_far,
                "mint admitted"
            ),
            Err(e) => warn!(class = ?e.kind(), "mint rejected: {}", e),
        }
        result
    }

    /// Like [`mint`](Self::mint), but only once the tracker has unlocked minting
    pub fn mint_when_ready(
        &self,
        status: &ReadinessStatus,
        request: &MintRequest,
    ) -> MintResult<MintReceipt> {
        if status.readiness == DepositReadiness::MissedMintingOpportunity {
            return Err(MintError::MissedMintingOpportunity {
                deposit_block: status.deposit_block,
            });
        }
        if !status.mint_unlocked {
            return Err(MintError::NotReady(status.readiness));
        }
        self.mint(request)
    }

    fn admit(&self, request: &MintRequest) -> MintResult<MintReceipt> {
        let record = &request.witness.leaf_value;

        let derived = derive_challenge(&request.code_verifier, &request.recipient).to_b256();
        if derived != record.attestation_hash {
            return Err(MintError::ChallengeMismatch {
                deposit: record.attestation_hash.to_string(),
                derived: derived.to_string(),
            });
        }

        let root = request.witness.verify()?;
        let window = request.window;
        self.ledger
            .committed_root(&window)?
            .ok_or(MintError::UnknownBatch {
                input: window.input_block_number,
                output: window.output_block_number,
            })?
            .check(root)?;

        let total_locked = record.locked_value;
        let minted_so_far = self
            .ledger
            .minted(&request.recipient)?
            .ok_or_else(|| MintError::StorageNotSetup(request.recipient.to_string()))?;

        if total_locked <= minted_so_far {
            return Err(MintError::StaleMint {
                total_locked: total_locked.to_string(),
                minted_so_far: minted_so_far.to_string(),
            });
        }

        if !self
            .ledger
            .compare_and_set(&request.recipient, minted_so_far, total_locked)?
        {
            return Err(MintError::LedgerConflict(request.recipient.to_string()));
        }

        Ok(MintReceipt {
            recipient: request.recipient,
            amount_minted: total_locked - minted_so_far,
            minted_so_far: total_locked,
        })
    }
}
