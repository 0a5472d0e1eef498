//! Lockbridge Client
//!
//! Networked side of the bridge coordinator: an HTTP client for the pipeline
//! feeds and the proof service, pollers that keep a [`FeedHub`] current, and a
//! file-backed cache of in-flight deposits.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use lockbridge_client::{BridgeClient, ClientConfig, FeedPoller};
//! use lockbridge_readiness::FeedHub;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::testnet();
//!     let client = Arc::new(BridgeClient::try_new(&config)?);
//!     let hub = FeedHub::new();
//!
//!     let failed = FeedPoller::new(client, hub.clone(), config).poll_all().await;
//!     println!("{} feeds failed, snapshot v{}", failed, hub.snapshot().version);
//!     Ok(())
//! }
//! ```
//!
//! [`FeedHub`]: lockbridge_readiness::FeedHub

mod cache;
mod client;
mod config;
mod error;
mod poller;
mod proof;
mod types;

pub use cache::{CachedDeposit, DepositCache};
pub use client::BridgeClient;
pub use config::{ClientConfig, RetryConfig};
pub use error::{ClientError, Result};
pub use poller::FeedPoller;
pub use proof::{AttestedDeposit, HttpProofService, ProofService};
pub use types::BatchDepositsResponse;
