//! Error types for the bridge client

use lockbridge_attest::AttestError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("Block {block} is outside batch window [{input}, {output}]")]
    WindowMismatch { block: u64, input: u64, output: u64 },

    #[error("Attestation error: {0}")]
    Attest(#[from] AttestError),

    #[error("Proof task failed: {0}")]
    ProofTask(String),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache entry invalid: {0}")]
    Cache(String),
}

impl ClientError {
    /// Transport failures and server-side errors; everything else is final
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_timeout() || e.is_connect(),
            Self::ApiError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
