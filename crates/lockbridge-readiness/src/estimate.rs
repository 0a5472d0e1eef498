//! Wait-time estimates
//!
//! Informational only; nothing in the state machine reads these.

use serde::{Deserialize, Serialize};

use crate::feeds::{BridgeHeadState, EthFinalityState, PipelineSnapshot, StageTimings};
use crate::stage::PipelineStage;
use crate::state::DepositReadiness;

/// Source-chain timing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalityParams {
    /// Unix time of slot 0
    pub genesis_time: u64,
    pub seconds_per_slot: u64,
    pub slots_per_epoch: u64,
    /// Epochs between a finalized slot and the next finality update
    pub epochs_to_finality: u64,
}

impl Default for FinalityParams {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl FinalityParams {
    /// Ethereum mainnet beacon chain
    pub fn mainnet() -> Self {
        Self {
            genesis_time: 1_606_824_023,
            seconds_per_slot: 12,
            slots_per_epoch: 32,
            epochs_to_finality: 3,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FinalityEstimator {
    params: FinalityParams,
}

impl FinalityEstimator {
    pub fn new(params: FinalityParams) -> Self {
        Self { params }
    }

    /// Unix time at which `slot` starts
    pub fn slot_time(&self, slot: u64) -> u64 {
        self.params
            .genesis_time
            .saturating_add(slot.saturating_mul(self.params.seconds_per_slot))
    }

    /// Slot at which the next finality update is expected
    pub fn next_finality_slot(&self, finality: &EthFinalityState) -> u64 {
        finality.latest_finality_slot.saturating_add(
            self.params
                .epochs_to_finality
                .saturating_mul(self.params.slots_per_epoch),
        )
    }

    /// Seconds from `now` until the next finality update, zero if overdue
    pub fn seconds_until_next_finality(&self, finality: &EthFinalityState, now: u64) -> u64 {
        self.slot_time(self.next_finality_slot(finality))
            .saturating_sub(now)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StageEstimator {
    timings: StageTimings,
}

impl StageEstimator {
    pub fn new(timings: StageTimings) -> Self {
        Self { timings }
    }

    /// Average minus elapsed for the running stage, saturating at zero
    pub fn remaining_in_stage(&self, stage: PipelineStage, elapsed_seconds: u64) -> u64 {
        self.timings
            .average(stage)
            .unwrap_or(0)
            .saturating_sub(elapsed_seconds)
    }

    /// Remaining time for the running job
    pub fn remaining_in_job(&self, bridge: &BridgeHeadState) -> u64 {
        let later: u64 = bridge
            .stage_name
            .remaining_after()
            .iter()
            .map(|s| self.timings.average(*s).unwrap_or(0))
            .sum();
        self.remaining_in_stage(bridge.stage_name, bridge.elapsed_seconds) + later
    }

    /// Sum of all stage averages
    pub fn full_job(&self) -> u64 {
        PipelineStage::ORDER
            .iter()
            .map(|s| self.timings.average(*s).unwrap_or(0))
            .sum()
    }
}

/// Expected wait for the deposit's next readiness milestone
pub fn estimate_wait(
    readiness: DepositReadiness,
    snapshot: &PipelineSnapshot,
    finality: &FinalityEstimator,
    now: u64,
) -> Option<u64> {
    let stages = StageEstimator::new(snapshot.stage_timings.clone().unwrap_or_default());
    match readiness {
        DepositReadiness::WaitingForEthFinality => snapshot
            .eth_finality
            .as_ref()
            .map(|f| finality.seconds_until_next_finality(f, now)),
        DepositReadiness::WaitingForCurrentJobCompletion => snapshot
            .bridge_head
            .as_ref()
            .map(|b| stages.remaining_in_job(b)),
        DepositReadiness::WaitingForPreviousJobCompletion => snapshot
            .bridge_head
            .as_ref()
            .map(|b| stages.remaining_in_job(b) + stages.full_job()),
        DepositReadiness::ReadyToMint | DepositReadiness::MissedMintingOpportunity => None,
    }
}
