// Legal domain - workflow stages and the legal case record
// Stages are a closed, ordered set; nothing outside these six exists

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One discrete step of the offer-to-completion legal workflow.
///
/// Variant order is the workflow order: `Ord` follows forward progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkflowStage {
    #[default]
    OfferCreated,
    #[serde(rename = "AIConsultation")]
    AiConsultation,
    LegalPackRequested,
    DueDiligence,
    Contracts,
    Completion,
}

impl WorkflowStage {
    pub const ALL: [WorkflowStage; 6] = [
        WorkflowStage::OfferCreated,
        WorkflowStage::AiConsultation,
        WorkflowStage::LegalPackRequested,
        WorkflowStage::DueDiligence,
        WorkflowStage::Contracts,
        WorkflowStage::Completion,
    ];

    /// Wire identifier, identical to the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OfferCreated => "OfferCreated",
            Self::AiConsultation => "AIConsultation",
            Self::LegalPackRequested => "LegalPackRequested",
            Self::DueDiligence => "DueDiligence",
            Self::Contracts => "Contracts",
            Self::Completion => "Completion",
        }
    }

    /// Position in the canonical sequence
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn next(&self) -> Option<WorkflowStage> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completion)
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown workflow stage: {0}")]
pub struct UnknownStage(pub String);

impl FromStr for WorkflowStage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|stage| stage.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}

/// A buyer's tracked journey through the legal workflow for a single offer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalCase {
    pub id: String,
    pub property_id: String,
    pub offer_id: String,
    pub stage: WorkflowStage,
    pub created_at: DateTime<Utc>,
}
