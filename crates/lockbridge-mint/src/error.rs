//! Error types for mint accounting

use lockbridge_attest::AttestError;
use lockbridge_readiness::DepositReadiness;
use thiserror::Error;

/// Broad failure classes, used to decide what a caller may retry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    InputValidation,
    IdentityConflict,
    AttestationMismatch,
    Liveness,
    Transient,
    StaleMint,
}

/// Errors that can occur while admitting a mint
#[derive(Debug, Error)]
pub enum MintError {
    /// Recipient never ran storage setup on the destination chain
    #[error("Mint storage not set up for recipient {0}")]
    StorageNotSetup(String),

    /// Challenge recomputed from (verifier, recipient) differs from the deposit's
    #[error("Challenge mismatch: deposit carries {deposit}, binding yields {derived}")]
    ChallengeMismatch { deposit: String, derived: String },

    /// Witness or committed-root verification failed
    #[error("Attestation rejected: {0}")]
    Attestation(#[from] AttestError),

    /// No consensus root has been relayed for the batch window
    #[error("No committed root for batch window [{input}, {output}]")]
    UnknownBatch { input: u64, output: u64 },

    /// A different root is already committed for the batch window
    #[error("Conflicting root for batch window [{input}, {output}]")]
    RootConflict { input: u64, output: u64 },

    /// The deposit is not ready to mint yet
    #[error("Deposit not ready to mint: {0}")]
    NotReady(DepositReadiness),

    /// The deposit's minting window has passed
    #[error("Deposit at block {deposit_block} missed its minting opportunity")]
    MissedMintingOpportunity { deposit_block: u64 },

    /// Nothing new to mint for this attested total
    #[error("Stale mint: total locked {total_locked}, already minted {minted_so_far}")]
    StaleMint {
        total_locked: String,
        minted_so_far: String,
    },

    /// Concurrent mint changed the ledger between read and write
    #[error("Ledger entry for {0} changed concurrently")]
    LedgerConflict(String),

    /// Ledger backend failure
    #[error("Ledger error: {0}")]
    Ledger(String),
}

impl MintError {
    pub fn kind(&self) -> ErrorClass {
        match self {
            Self::StorageNotSetup(_) => ErrorClass::InputValidation,
            Self::ChallengeMismatch { .. } => ErrorClass::IdentityConflict,
            Self::Attestation(_) | Self::RootConflict { .. } => ErrorClass::AttestationMismatch,
            Self::UnknownBatch { .. } => ErrorClass::Liveness,
            Self::NotReady(_) | Self::MissedMintingOpportunity { .. } => ErrorClass::Liveness,
            Self::StaleMint { .. } => ErrorClass::StaleMint,
            Self::LedgerConflict(_) | Self::Ledger(_) => ErrorClass::Transient,
        }
    }

    /// Only infrastructure failures are worth retrying
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorClass::Transient
    }
}

/// Result type for mint operations
pub type MintResult<T> = Result<T, MintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(MintError::LedgerConflict("r".into()).is_retryable());
        assert!(!MintError::StaleMint {
            total_locked: "10".into(),
            minted_so_far: "10".into()
        }
        .is_retryable());
        assert!(!MintError::Attestation(AttestError::EmptyBatch).is_retryable());
        assert!(!MintError::MissedMintingOpportunity { deposit_block: 1 }.is_retryable());
    }

    #[test]
    fn test_classes() {
        assert_eq!(
            MintError::StorageNotSetup("r".into()).kind(),
            ErrorClass::InputValidation
        );
        assert_eq!(
            MintError::ChallengeMismatch {
                deposit: "a".into(),
                derived: "b".into()
            }
            .kind(),
            ErrorClass::IdentityConflict
        );
        assert_eq!(
            MintError::NotReady(DepositReadiness::WaitingForEthFinality).kind(),
            ErrorClass::Liveness
        );
        assert_eq!(
            MintError::UnknownBatch {
                input: 1,
                output: 2
            }
            .kind(),
            ErrorClass::Liveness
        );
        assert!(!MintError::RootConflict {
            input: 1,
            output: 2
        }
        .is_retryable());
    }
}
