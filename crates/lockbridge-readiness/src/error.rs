//! Error types for readiness tracking

use thiserror::Error;

/// Errors raised by the readiness tracker
#[derive(Debug, Error)]
pub enum ReadinessError {
    /// Deposit block numbers start at 1
    #[error("Invalid deposit block number: {0}")]
    InvalidDepositBlock(u64),

    /// The pipeline moved past the deposit's batch before it could be tracked
    #[error("Deposit at block {deposit_block} missed its minting opportunity")]
    MissedMintingOpportunity { deposit_block: u64 },

    /// The tracker task ended before reaching the awaited signal
    #[error("Readiness tracker for block {deposit_block} stopped")]
    TrackerStopped { deposit_block: u64 },

    /// The feed hub was dropped
    #[error("Pipeline feed closed")]
    FeedClosed,
}

impl ReadinessError {
    /// Liveness failures are terminal but not verification failures
    pub fn is_liveness(&self) -> bool {
        matches!(self, Self::MissedMintingOpportunity { .. })
    }
}

/// Result type for readiness operations
pub type ReadinessResult<T> = Result<T, ReadinessError>;
