// Step descriptors for progress tracking and orchestration

use serde::Serialize;

use crate::domain::WorkflowStage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LegalWorkflowStep {
    pub stage: WorkflowStage,
    pub description: &'static str,
}

pub const LEGAL_WORKFLOW_STEPS: [LegalWorkflowStep; 6] = [
    LegalWorkflowStep {
        stage: WorkflowStage::OfferCreated,
        description: "Offer has been created.",
    },
    LegalWorkflowStep {
        stage: WorkflowStage::AiConsultation,
        description: "AI legal consultation is pending.",
    },
    LegalWorkflowStep {
        stage: WorkflowStage::LegalPackRequested,
        description: "Legal document pack requested.",
    },
    LegalWorkflowStep {
        stage: WorkflowStage::DueDiligence,
        description: "Due diligence in progress.",
    },
    LegalWorkflowStep {
        stage: WorkflowStage::Contracts,
        description: "Contracts being prepared and reviewed.",
    },
    LegalWorkflowStep {
        stage: WorkflowStage::Completion,
        description: "Transaction completion.",
    },
];

/// Ordered stage catalog with descriptions
pub fn stage_catalog() -> &'static [LegalWorkflowStep] {
    &LEGAL_WORKFLOW_STEPS
}

pub fn step_for(stage: WorkflowStage) -> &'static LegalWorkflowStep {
    &LEGAL_WORKFLOW_STEPS[stage.index()]
}
