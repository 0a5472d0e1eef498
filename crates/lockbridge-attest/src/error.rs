//! Error types for attestation operations

use lockbridge_primitives::PrimitivesError;
use thiserror::Error;

/// Errors that can occur while building or checking attestations
#[derive(Debug, Error)]
pub enum AttestError {
    /// Batch is empty
    #[error("Batch cannot be empty")]
    EmptyBatch,

    /// Batch exceeds maximum size
    #[error("Batch size {size} exceeds maximum {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// Leaf index outside the batch
    #[error("Leaf index {index} out of bounds (num leaves: {len})")]
    LeafIndexOutOfBounds { index: usize, len: usize },

    /// Folding the witness path did not reproduce the witness root
    #[error("Witness root mismatch: expected {expected}, computed {actual}")]
    RootMismatch { expected: String, actual: String },

    /// Computed batch root differs from the root committed on the source chain
    #[error("Committed root mismatch: committed {committed}, computed {computed}")]
    CommittedRootMismatch { committed: String, computed: String },

    /// Structurally invalid witness
    #[error("Invalid witness: {0}")]
    InvalidWitness(String),

    /// Deposit is not part of the batch
    #[error("Deposit {address}/{challenge} not found in batch")]
    DepositNotFound { address: String, challenge: String },

    /// Committed root could not be parsed
    #[error("Invalid committed root: {0}")]
    InvalidRoot(String),

    /// Deserialization error
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Serialization error
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Field or hex conversion error
    #[error(transparent)]
    Primitives(#[from] PrimitivesError),
}

impl AttestError {
    pub fn invalid_witness<S: Into<String>>(message: S) -> Self {
        Self::InvalidWitness(message.into())
    }

    /// True for failures that mean the attestation does not hold
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::RootMismatch { .. } | Self::CommittedRootMismatch { .. } | Self::InvalidWitness(_)
        )
    }
}

/// Result type for attestation operations
pub type AttestResult<T> = Result<T, AttestError>;
