//! Error types for lockbridge primitives

use thiserror::Error;

/// Errors raised while converting bytes, hex and field elements
#[derive(Debug, Error)]
pub enum PrimitivesError {
    /// Invalid hex string in a named field
    #[error("Invalid hex in {field}: {source}")]
    InvalidHex {
        field: &'static str,
        source: hex::FromHexError,
    },

    /// Decoded bytes had the wrong length
    #[error("Invalid length for {field}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Bytes encode an integer at or above the field modulus
    #[error("Non-canonical field element: {0}")]
    NonCanonicalField(String),
}

/// Result type for primitive operations
pub type PrimitivesResult<T> = Result<T, PrimitivesError>;
