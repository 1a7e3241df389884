// Legal workflow events and the canonical sequence used to validate transitions

use serde::{Deserialize, Serialize};

use crate::domain::WorkflowStage;

/// Canonical ordering; the only source of truth for valid forward motion
pub const LEGAL_WORKFLOW_EVENT_SEQUENCE: [&str; 6] = [
    "OfferCreated",
    "AIConsultation",
    "LegalPackRequested",
    "DueDiligence",
    "Contracts",
    "Completion",
];

/// Position of a stage identifier in the sequence, `None` when it is not a stage
pub fn sequence_index(stage: &str) -> Option<usize> {
    LEGAL_WORKFLOW_EVENT_SEQUENCE.iter().position(|s| *s == stage)
}

/// A request to move a case to `target_stage`.
///
/// The target is kept as the raw identifier the caller supplied so that
/// malformed requests can reach the transition function and be rejected there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalWorkflowEvent {
    pub case_id: String,
    pub target_stage: String,
}

impl LegalWorkflowEvent {
    pub fn new(case_id: impl Into<String>, target_stage: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            target_stage: target_stage.into(),
        }
    }

    pub fn to_stage(case_id: impl Into<String>, target: WorkflowStage) -> Self {
        Self::new(case_id, target.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_matches_stage_enum() {
        for stage in WorkflowStage::ALL {
            assert_eq!(sequence_index(stage.as_str()), Some(stage.index()));
        }
        assert_eq!(sequence_index("Escrow"), None);
    }
}
