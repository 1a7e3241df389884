// Legal workflow state machine
// A case may stay where it is or move exactly one stage forward; nothing else is applied

use serde::{Deserialize, Serialize};
use std::fmt;

use super::events::{sequence_index, LegalWorkflowEvent};
use crate::domain::WorkflowStage;

/// Current position of one legal case
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LegalWorkflowState {
    pub case_id: String,
    pub stage: WorkflowStage,
}

impl LegalWorkflowState {
    pub fn new(case_id: impl Into<String>, stage: WorkflowStage) -> Self {
        Self {
            case_id: case_id.into(),
            stage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectionReason {
    /// Target is not one of the six workflow stages
    InvalidTarget { target: String },
    /// Backward move, or a forward skip of two or more stages
    NotAdjacent { from: WorkflowStage, to: WorkflowStage },
    /// Event addressed to a different case
    CaseMismatch { expected: String, actual: String },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTarget { target } => write!(f, "'{}' is not a workflow stage", target),
            Self::NotAdjacent { from, to } => {
                write!(f, "cannot move from {} to {}: only the next stage is allowed", from, to)
            }
            Self::CaseMismatch { expected, actual } => {
                write!(f, "event for case {} applied to case {}", actual, expected)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransitionOutcome {
    Applied {
        previous_stage: WorkflowStage,
        state: LegalWorkflowState,
    },
    Rejected {
        state: LegalWorkflowState,
        reason: RejectionReason,
    },
}

impl TransitionOutcome {
    /// Resulting state, whether or not the transition was applied
    pub fn state(&self) -> &LegalWorkflowState {
        match self {
            Self::Applied { state, .. } | Self::Rejected { state, .. } => state,
        }
    }

    pub fn into_state(self) -> LegalWorkflowState {
        match self {
            Self::Applied { state, .. } | Self::Rejected { state, .. } => state,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// Applied to the stage the case was already in
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::Applied { previous_stage, state } if *previous_stage == state.stage)
    }

    pub fn rejection(&self) -> Option<&RejectionReason> {
        match self {
            Self::Rejected { reason, .. } => Some(reason),
            Self::Applied { .. } => None,
        }
    }
}

/// Evaluate a request to move `state` to `target`, reporting why it was refused.
///
/// `target` is the raw stage identifier; identifiers outside the canonical
/// sequence are rejected as [`RejectionReason::InvalidTarget`].
pub fn try_transition(state: &LegalWorkflowState, target: &str) -> TransitionOutcome {
    let current_index = state.stage.index();

    let Some(target_index) = sequence_index(target) else {
        return TransitionOutcome::Rejected {
            state: state.clone(),
            reason: RejectionReason::InvalidTarget {
                target: target.to_string(),
            },
        };
    };
    let target_stage = WorkflowStage::ALL[target_index];

    if target_index == current_index || target_index == current_index + 1 {
        TransitionOutcome::Applied {
            previous_stage: state.stage,
            state: LegalWorkflowState {
                case_id: state.case_id.clone(),
                stage: target_stage,
            },
        }
    } else {
        TransitionOutcome::Rejected {
            state: state.clone(),
            reason: RejectionReason::NotAdjacent {
                from: state.stage,
                to: target_stage,
            },
        }
    }
}

/// Silent-rejection form: invalid requests return the input state unchanged
pub fn transition(state: &LegalWorkflowState, target: &str) -> LegalWorkflowState {
    try_transition(state, target).into_state()
}

pub fn transition_to(state: &LegalWorkflowState, target: WorkflowStage) -> TransitionOutcome {
    try_transition(state, target.as_str())
}

/// Apply an event, refusing events addressed to another case
pub fn apply_event(state: &LegalWorkflowState, event: &LegalWorkflowEvent) -> TransitionOutcome {
    if event.case_id != state.case_id {
        return TransitionOutcome::Rejected {
            state: state.clone(),
            reason: RejectionReason::CaseMismatch {
                expected: state.case_id.clone(),
                actual: event.case_id.clone(),
            },
        };
    }
    try_transition(state, &event.target_stage)
}
