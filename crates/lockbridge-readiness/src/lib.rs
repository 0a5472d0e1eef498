//! Lockbridge Deposit Readiness
//!
//! Tracks one deposit against two independently advancing sources of truth:
//! source-chain finality and the bridge's batch-processing pipeline.
//!
//! - **State machine**: `DepositReadiness` plus a pure `transition` function
//! - **Feeds**: `FeedHub` last-value cache of the joint `PipelineSnapshot`
//! - **Tracker**: async task exposing the attestation and mint signals
//! - **Estimates**: informational finality and stage countdowns
//!
//! # Usage
//!
//! ```ignore
//! let hub = FeedHub::new();
//! let mut handle = spawn_tracker(&hub, deposit_block, FinalityParams::mainnet())?;
//!
//! handle.wait_for_attestation().await?;
//! // build the attestation witness
//! handle.wait_for_mint().await?;
//! // submit the mint
//! ```

pub mod error;
pub mod estimate;
pub mod feeds;
pub mod hub;
pub mod stage;
pub mod state;
pub mod tracker;

pub use error::{ReadinessError, ReadinessResult};
pub use estimate::{estimate_wait, FinalityEstimator, FinalityParams, StageEstimator};
pub use feeds::{
    BridgeHeadState, EthFinalityState, Feed, FeedHealth, PipelineSnapshot, StageTimings,
};
pub use hub::{FeedHub, Subscription};
pub use stage::PipelineStage;
pub use state::{
    classify, detect_stage_change, next_readiness, transition, DepositReadiness, TrackerState,
};
pub use tracker::{spawn_tracker, ReadinessHandle, ReadinessStatus};
