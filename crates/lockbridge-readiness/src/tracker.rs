//! Per-deposit tracker task
//!
//! `spawn_tracker` subscribes to the feed hub and applies every snapshot to
//! the deposit's [`TrackerState`], publishing a [`ReadinessStatus`] after each
//! step. The task ends when the deposit reaches a terminal state, when the
//! hub goes away, or on shutdown. Its subscription is dropped in every case.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{ReadinessError, ReadinessResult};
use crate::estimate::{estimate_wait, FinalityEstimator, FinalityParams};
use crate::feeds::PipelineSnapshot;
use crate::hub::{FeedHub, Subscription};
use crate::state::{transition, DepositReadiness, TrackerState};

/// Published view of one deposit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessStatus {
    pub deposit_block: u64,
    pub readiness: DepositReadiness,
    pub attestation_unlocked: bool,
    pub mint_unlocked: bool,
    /// A gating feed is missing or unhealthy
    pub paused: bool,
    pub estimated_wait_seconds: Option<u64>,
    pub snapshot_version: u64,
}

impl ReadinessStatus {
    pub fn from_state(
        state: &TrackerState,
        snapshot: &PipelineSnapshot,
        finality: &FinalityEstimator,
        now: u64,
    ) -> Self {
        Self {
            deposit_block: state.deposit_block,
            readiness: state.readiness,
            attestation_unlocked: state.attestation_unlocked,
            mint_unlocked: state.mint_unlocked(),
            paused: !state.is_terminal() && !snapshot.is_trackable(),
            estimated_wait_seconds: estimate_wait(state.readiness, snapshot, finality, now),
            snapshot_version: snapshot.version,
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Handle to a running tracker; dropping it stops the task
#[derive(Debug)]
pub struct ReadinessHandle {
    deposit_block: u64,
    status: watch::Receiver<ReadinessStatus>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReadinessHandle {
    pub fn deposit_block(&self) -> u64 {
        self.deposit_block
    }

    /// Latest published status
    pub fn status(&self) -> ReadinessStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ReadinessStatus> {
        self.status.clone()
    }

    /// Resolve once the attestation proof may be computed
    pub async fn wait_for_attestation(&mut self) -> ReadinessResult<ReadinessStatus> {
        self.wait_until(|s| s.attestation_unlocked).await
    }

    /// Resolve once the mint may be submitted
    pub async fn wait_for_mint(&mut self) -> ReadinessResult<ReadinessStatus> {
        self.wait_until(|s| s.mint_unlocked).await
    }

    async fn wait_until(
        &mut self,
        signal: impl Fn(&ReadinessStatus) -> bool,
    ) -> ReadinessResult<ReadinessStatus> {
        let deposit_block = self.deposit_block;
        let status = self
            .status
            .wait_for(|s| signal(s) || s.readiness.is_terminal())
            .await
            .map_err(|_| ReadinessError::TrackerStopped { deposit_block })?
            .clone();

        if signal(&status) {
            Ok(status)
        } else if status.readiness == DepositReadiness::MissedMintingOpportunity {
            Err(ReadinessError::MissedMintingOpportunity { deposit_block })
        } else {
            Err(ReadinessError::TrackerStopped { deposit_block })
        }
    }

    /// Signal shutdown and wait for the task to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!(deposit_block = self.deposit_block, "tracker task failed: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Start tracking one deposit against the hub's feeds.
///
/// Must be called from within a tokio runtime.
pub fn spawn_tracker(
    hub: &FeedHub,
    deposit_block: u64,
    params: FinalityParams,
) -> ReadinessResult<ReadinessHandle> {
    let state = TrackerState::new(deposit_block)?;
    let mut subscription = hub.subscribe();
    let snapshot = subscription.current();
    let estimator = FinalityEstimator::new(params);

    let initial = ReadinessStatus::from_state(&state, &snapshot, &estimator, unix_now());
    let (status_tx, status_rx) = watch::channel(initial);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(run_tracker(
        subscription,
        snapshot,
        state,
        estimator,
        status_tx,
        shutdown_rx,
    ));

    Ok(ReadinessHandle {
        deposit_block,
        status: status_rx,
        shutdown: shutdown_tx,
        task,
    })
}

async fn run_tracker(
    mut subscription: Subscription,
    mut snapshot: PipelineSnapshot,
    mut state: TrackerState,
    estimator: FinalityEstimator,
    status_tx: watch::Sender<ReadinessStatus>,
    mut shutdown: watch::Receiver<bool>,
) {
    let deposit_block = state.deposit_block;
    debug!(deposit_block, "readiness tracker started");

    loop {
        let next = transition(&state, &snapshot);
        if next.readiness != state.readiness {
            info!(
                deposit_block,
                from = %state.readiness,
                to = %next.readiness,
                "deposit readiness changed"
            );
        }
        if next.attestation_unlocked && !state.attestation_unlocked {
            info!(deposit_block, "attestation proof unlocked");
        }
        state = next;
        status_tx.send_replace(ReadinessStatus::from_state(
            &state,
            &snapshot,
            &estimator,
            unix_now(),
        ));

        if state.is_terminal() {
            break;
        }

        tokio::select! {
            changed = subscription.changed() => match changed {
                Ok(next_snapshot) => snapshot = next_snapshot,
                Err(e) => {
                    warn!(deposit_block, "stopping tracker: {}", e);
                    break;
                }
            },
            stop = shutdown.changed() => {
                if stop.is_err() || *shutdown.borrow() {
                    debug!(deposit_block, "tracker shut down");
                    break;
                }
            }
        }
    }
}
