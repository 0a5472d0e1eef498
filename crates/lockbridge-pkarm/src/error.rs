//! Error types for identity binding

use lockbridge_primitives::PrimitivesError;
use thiserror::Error;

/// Errors that can occur while deriving or checking identity bindings
#[derive(Debug, Error)]
pub enum PkarmError {
    /// Wallet signature has the wrong length
    #[error("Invalid signature length: expected {expected} bytes, got {actual}")]
    InvalidSignatureLength { expected: usize, actual: usize },

    /// Recipient identity could not be parsed
    #[error("Invalid recipient identity: {0}")]
    InvalidRecipient(String),

    /// Challenge bytes are not a canonical field element
    #[error("Invalid challenge: {0}")]
    InvalidChallenge(String),

    /// Challenge does not match (verifier, recipient)
    #[error("Challenge mismatch: expected {expected}, got {actual}")]
    ChallengeMismatch { expected: String, actual: String },

    /// Challenge already bound to another depositor
    #[error("Challenge {challenge} is bound to {owner}, rejected deposit from {depositor}")]
    IdentityConflict {
        challenge: String,
        owner: String,
        depositor: String,
    },

    /// Lock value is zero or not a multiple of the minimum unit
    #[error("Invalid lock value {value}: must be a non-zero multiple of {unit}")]
    InvalidLockValue { value: String, unit: String },

    /// Accumulated total or contract balance would exceed 256 bits
    #[error("Lock of {value} overflows the locked total")]
    LockOverflow { value: String },

    /// Caller is not the contract operator
    #[error("Caller {0} is not the operator")]
    NotOperator(String),

    /// Withdrawal exceeds the locked balance
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: String, available: String },

    /// Signing key is unusable
    #[error("Invalid signing key: {0}")]
    InvalidSigningKey(String),

    /// ECDSA signing failed
    #[error("Signing failed: {0}")]
    Signing(String),

    #[error(transparent)]
    Primitives(#[from] PrimitivesError),
}

/// Result type for identity binding operations
pub type PkarmResult<T> = Result<T, PkarmError>;
