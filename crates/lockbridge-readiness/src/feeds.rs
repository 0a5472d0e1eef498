//! Pipeline feed payloads and the joint snapshot

use std::collections::BTreeMap;

use lockbridge_attest::BatchWindow;
use serde::{Deserialize, Serialize};

use crate::stage::PipelineStage;

/// Source-chain finality frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthFinalityState {
    pub latest_finality_block_number: u64,
    pub latest_finality_slot: u64,
}

/// Current batch-processing job and its sub-stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeHeadState {
    pub input_block_number: u64,
    pub output_block_number: u64,
    pub stage_name: PipelineStage,
    pub elapsed_seconds: u64,
}

impl BridgeHeadState {
    pub fn window(&self) -> BatchWindow {
        BatchWindow::new(self.input_block_number, self.output_block_number)
    }
}

/// Published average duration of each stage, in seconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageTimings(pub BTreeMap<PipelineStage, u64>);

impl StageTimings {
    pub fn average(&self, stage: PipelineStage) -> Option<u64> {
        self.0.get(&stage).copied()
    }
}

/// One of the three pipeline topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    EthFinality,
    BridgeHead,
    StageTimings,
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feed::EthFinality => f.write_str("eth-finality"),
            Feed::BridgeHead => f.write_str("bridge-head"),
            Feed::StageTimings => f.write_str("stage-timings"),
        }
    }
}

/// Per-feed health; a feed is unhealthy while its poller is failing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedHealth {
    pub eth_finality: bool,
    pub bridge_head: bool,
    pub stage_timings: bool,
}

impl Default for FeedHealth {
    fn default() -> Self {
        Self {
            eth_finality: true,
            bridge_head: true,
            stage_timings: true,
        }
    }
}

impl FeedHealth {
    pub fn get(&self, feed: Feed) -> bool {
        match feed {
            Feed::EthFinality => self.eth_finality,
            Feed::BridgeHead => self.bridge_head,
            Feed::StageTimings => self.stage_timings,
        }
    }

    pub fn set(&mut self, feed: Feed, healthy: bool) {
        match feed {
            Feed::EthFinality => self.eth_finality = healthy,
            Feed::BridgeHead => self.bridge_head = healthy,
            Feed::StageTimings => self.stage_timings = healthy,
        }
    }
}

/// Latest value of every feed, sampled together
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSnapshot {
    pub eth_finality: Option<EthFinalityState>,
    pub bridge_head: Option<BridgeHeadState>,
    pub stage_timings: Option<StageTimings>,
    pub health: FeedHealth,
    /// Bumped on every published change
    pub version: u64,
}

impl PipelineSnapshot {
    /// Both gating feeds present and healthy (timings never gate)
    pub fn is_trackable(&self) -> bool {
        self.eth_finality.is_some()
            && self.bridge_head.is_some()
            && self.health.eth_finality
            && self.health.bridge_head
    }
}
