//! Pipeline sub-stages
//!
//! The bridge pipeline reports the current job's sub-stage by name. Two of
//! them drive readiness: proof conversion succeeding unlocks attestation and
//! transaction finalization succeeding completes the job.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PipelineStage {
    BridgeHeadJobCreated,
    BridgeHeadJobSucceeded,
    ProofConversionJobReceived,
    ProofConversionJobSucceeded,
    EthProcessorProofRequest,
    EthProcessorProofSucceeded,
    EthProcessorTransactionSubmitSucceeded,
    EthProcessorTransactionFinalizationSucceeded,
    /// Any stage name this build does not know
    #[serde(other)]
    Unknown,
}

impl PipelineStage {
    /// Known stages in job order
    pub const ORDER: [PipelineStage; 8] = [
        PipelineStage::BridgeHeadJobCreated,
        PipelineStage::BridgeHeadJobSucceeded,
        PipelineStage::ProofConversionJobReceived,
        PipelineStage::ProofConversionJobSucceeded,
        PipelineStage::EthProcessorProofRequest,
        PipelineStage::EthProcessorProofSucceeded,
        PipelineStage::EthProcessorTransactionSubmitSucceeded,
        PipelineStage::EthProcessorTransactionFinalizationSucceeded,
    ];

    /// Position in [`PipelineStage::ORDER`], `None` for `Unknown`
    pub fn position(&self) -> Option<usize> {
        Self::ORDER.iter().position(|s| s == self)
    }

    /// Stages that still follow this one within the same job
    pub fn remaining_after(&self) -> &'static [PipelineStage] {
        match self.position() {
            Some(i) => &Self::ORDER[i + 1..],
            None => &[],
        }
    }

    pub fn unlocks_attestation(&self) -> bool {
        *self == PipelineStage::ProofConversionJobSucceeded
    }

    pub fn completes_job(&self) -> bool {
        *self == PipelineStage::EthProcessorTransactionFinalizationSucceeded
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&PipelineStage::ProofConversionJobSucceeded).unwrap();
        assert_eq!(json, "\"ProofConversionJobSucceeded\"");

        let stage: PipelineStage =
            serde_json::from_str("\"EthProcessorTransactionFinalizationSucceeded\"").unwrap();
        assert!(stage.completes_job());
    }

    #[test]
    fn test_unknown_stage() {
        let stage: PipelineStage = serde_json::from_str("\"SomethingNew\"").unwrap();
        assert_eq!(stage, PipelineStage::Unknown);
        assert_eq!(stage.position(), None);
        assert!(stage.remaining_after().is_empty());
    }

    #[test]
    fn test_remaining_after() {
        assert_eq!(PipelineStage::BridgeHeadJobCreated.remaining_after().len(), 7);
        assert!(PipelineStage::EthProcessorTransactionFinalizationSucceeded
            .remaining_after()
            .is_empty());
    }
}
