//! Deposit readiness state machine
//!
//! ```text
//! WaitingForEthFinality
//!   -> WaitingForPreviousJobCompletion -> WaitingForCurrentJobCompletion -> ReadyToMint
//!   -> WaitingForCurrentJobCompletion  -> ReadyToMint
//! any non-terminal -> MissedMintingOpportunity
//! ```
//!
//! Readiness is a pure function of the previous state, the sub-stage change
//! (if any) and the latest joint snapshot. A deposit past finality never
//! falls back to waiting for it, and only the job whose window contains the
//! deposit can unlock attestation or mint.

use serde::{Deserialize, Serialize};

use crate::error::{ReadinessError, ReadinessResult};
use crate::feeds::{BridgeHeadState, EthFinalityState, PipelineSnapshot};
use crate::stage::PipelineStage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepositReadiness {
    /// Deposit block is not yet finalized on the source chain
    WaitingForEthFinality,
    /// Deposit lies after the current job's window
    WaitingForPreviousJobCompletion,
    /// Deposit lies inside the current job's window
    WaitingForCurrentJobCompletion,
    ReadyToMint,
    /// The pipeline processed the deposit's batch without it being tracked
    MissedMintingOpportunity,
}

impl DepositReadiness {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ReadyToMint | Self::MissedMintingOpportunity)
    }

    pub fn rank(&self) -> u8 {
        match self {
            Self::WaitingForEthFinality => 0,
            Self::WaitingForPreviousJobCompletion => 1,
            Self::WaitingForCurrentJobCompletion => 2,
            Self::ReadyToMint => 3,
            Self::MissedMintingOpportunity => 4,
        }
    }
}

impl std::fmt::Display for DepositReadiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Level classification from the current finality frontier and job window
pub fn classify(
    deposit_block: u64,
    finality: &EthFinalityState,
    bridge: &BridgeHeadState,
) -> DepositReadiness {
    if deposit_block > finality.latest_finality_block_number {
        DepositReadiness::WaitingForEthFinality
    } else {
        classify_window(deposit_block, bridge)
    }
}

/// Sub-stage change between the last observed stage and the current one.
///
/// The first observation only establishes a baseline.
pub fn detect_stage_change(
    last: Option<PipelineStage>,
    current: PipelineStage,
) -> Option<PipelineStage> {
    match last {
        Some(previous) if previous != current => Some(current),
        _ => None,
    }
}

/// Job-window classification once the deposit is known to be finalized
fn classify_window(deposit_block: u64, bridge: &BridgeHeadState) -> DepositReadiness {
    if deposit_block < bridge.input_block_number {
        DepositReadiness::MissedMintingOpportunity
    } else if deposit_block > bridge.output_block_number {
        DepositReadiness::WaitingForPreviousJobCompletion
    } else {
        DepositReadiness::WaitingForCurrentJobCompletion
    }
}

/// One step of the readiness machine.
///
/// Once past finality the deposit never returns to `WaitingForEthFinality`,
/// even on a stale finality report. Previous/current are re-derived from the
/// snapshot's job window, and `ReadyToMint` requires the finalized job's
/// window to contain the deposit block.
pub fn next_readiness(
    current: DepositReadiness,
    stage_change: Option<PipelineStage>,
    deposit_block: u64,
    finality: &EthFinalityState,
    bridge: &BridgeHeadState,
) -> DepositReadiness {
    if current.is_terminal() {
        return current;
    }

    let classified = if current == DepositReadiness::WaitingForEthFinality {
        classify(deposit_block, finality, bridge)
    } else {
        classify_window(deposit_block, bridge)
    };
    let job_finalized = stage_change.is_some_and(|s| s.completes_job());

    match classified {
        DepositReadiness::WaitingForCurrentJobCompletion if job_finalized => {
            DepositReadiness::ReadyToMint
        }
        // The job ahead of the deposit just finalized; the next one starts
        // after its window.
        DepositReadiness::WaitingForPreviousJobCompletion if job_finalized => {
            DepositReadiness::WaitingForCurrentJobCompletion
        }
        // Held until the next job is published
        DepositReadiness::WaitingForPreviousJobCompletion
            if current == DepositReadiness::WaitingForCurrentJobCompletion
                && bridge.stage_name.completes_job() =>
        {
            DepositReadiness::WaitingForCurrentJobCompletion
        }
        classified => classified,
    }
}

/// Per-deposit tracker state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerState {
    pub deposit_block: u64,
    pub readiness: DepositReadiness,
    pub last_stage: Option<PipelineStage>,
    /// Latched once the attestation proof may be computed
    pub attestation_unlocked: bool,
    /// Snapshot version last applied
    pub last_version: u64,
}

impl TrackerState {
    pub fn new(deposit_block: u64) -> ReadinessResult<Self> {
        if deposit_block == 0 {
            return Err(ReadinessError::InvalidDepositBlock(deposit_block));
        }
        Ok(Self {
            deposit_block,
            readiness: DepositReadiness::WaitingForEthFinality,
            last_stage: None,
            attestation_unlocked: false,
            last_version: 0,
        })
    }

    pub fn mint_unlocked(&self) -> bool {
        self.readiness == DepositReadiness::ReadyToMint
    }

    pub fn is_terminal(&self) -> bool {
        self.readiness.is_terminal()
    }
}

/// Apply a snapshot to a tracker state.
///
/// Terminal states are returned unchanged. A snapshot with a missing or
/// unhealthy gating feed pauses tracking: nothing changes, including the
/// last observed stage.
pub fn transition(prev: &TrackerState, snapshot: &PipelineSnapshot) -> TrackerState {
    if prev.is_terminal() || !snapshot.is_trackable() {
        return prev.clone();
    }
    let (Some(finality), Some(bridge)) = (&snapshot.eth_finality, &snapshot.bridge_head) else {
        return prev.clone();
    };

    let stage_change = detect_stage_change(prev.last_stage, bridge.stage_name);
    let readiness = next_readiness(
        prev.readiness,
        stage_change,
        prev.deposit_block,
        finality,
        bridge,
    );

    let attestation_unlocked = prev.attestation_unlocked
        || readiness == DepositReadiness::ReadyToMint
        || (readiness == DepositReadiness::WaitingForCurrentJobCompletion
            && stage_change.is_some_and(|s| s.unlocks_attestation()));

    TrackerState {
        deposit_block: prev.deposit_block,
        readiness,
        last_stage: Some(bridge.stage_name),
        attestation_unlocked,
        last_version: snapshot.version,
    }
}
