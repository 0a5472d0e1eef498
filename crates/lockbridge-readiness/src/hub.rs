//! Feed hub: last-value cache for the pipeline topics
//!
//! All three topics share a single `watch` channel holding the whole
//! [`PipelineSnapshot`]. Each publish edits the snapshot in place, so a
//! reader always sees one consistent joint value. A late subscriber starts
//! from the current snapshot.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{ReadinessError, ReadinessResult};
use crate::feeds::{BridgeHeadState, EthFinalityState, Feed, PipelineSnapshot, StageTimings};

#[derive(Debug, Clone)]
pub struct FeedHub {
    tx: Arc<watch::Sender<PipelineSnapshot>>,
}

impl Default for FeedHub {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedHub {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(PipelineSnapshot::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn publish_eth_finality(&self, state: EthFinalityState) {
        self.tx.send_modify(|snapshot| {
            snapshot.eth_finality = Some(state);
            snapshot.version += 1;
        });
    }

    pub fn publish_bridge_head(&self, state: BridgeHeadState) {
        self.tx.send_modify(|snapshot| {
            snapshot.bridge_head = Some(state);
            snapshot.version += 1;
        });
    }

    pub fn publish_stage_timings(&self, timings: StageTimings) {
        self.tx.send_modify(|snapshot| {
            snapshot.stage_timings = Some(timings);
            snapshot.version += 1;
        });
    }

    /// Publish finality and bridge state as one update
    pub fn publish_joint(&self, finality: EthFinalityState, bridge: BridgeHeadState) {
        self.tx.send_modify(|snapshot| {
            snapshot.eth_finality = Some(finality);
            snapshot.bridge_head = Some(bridge);
            snapshot.version += 1;
        });
    }

    /// Mark a feed healthy or unhealthy; notifies only on change
    pub fn set_health(&self, feed: Feed, healthy: bool) {
        let changed = self.tx.send_if_modified(|snapshot| {
            if snapshot.health.get(feed) == healthy {
                return false;
            }
            snapshot.health.set(feed, healthy);
            snapshot.version += 1;
            true
        });
        if changed {
            if healthy {
                debug!(%feed, "feed recovered");
            } else {
                warn!(%feed, "feed unhealthy, tracking paused");
            }
        }
    }

    /// Current joint snapshot
    pub fn snapshot(&self) -> PipelineSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A live view of the hub; dropping it unsubscribes
#[derive(Debug)]
pub struct Subscription {
    rx: watch::Receiver<PipelineSnapshot>,
}

impl Subscription {
    /// Current snapshot, marking it seen
    pub fn current(&mut self) -> PipelineSnapshot {
        self.rx.borrow_and_update().clone()
    }

    /// Wait for the next unseen snapshot
    pub async fn changed(&mut self) -> ReadinessResult<PipelineSnapshot> {
        self.rx
            .changed()
            .await
            .map_err(|_| ReadinessError::FeedClosed)?;
        Ok(self.rx.borrow_and_update().clone())
    }
}
