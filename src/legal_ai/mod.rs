// Legal AI consultation - provider-agnostic contracts, prompts, adapters and clients

pub mod adapters;
pub mod client;
pub mod prompts;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::WorkflowStage;

pub use adapters::{JsonPayloadAdapter, LegalAiAdapter};
pub use client::{consult_with_timeout, CannedLegalAiClient, LegalAiClient};
pub use prompts::{build_consultation_prompts, PromptBundle};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationRequest {
    pub case_id: String,
    pub stage: WorkflowStage,
    pub country_code: String,
    pub context_summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationResponse {
    pub clarifying_questions: Vec<String>,
    pub readiness_summary: String,
    pub recommended_next_stage: WorkflowStage,
}

#[derive(Debug, Error)]
pub enum LegalAiError {
    #[error("Consultation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Malformed provider payload: {0}")]
    MalformedPayload(String),

    #[error("Provider error: {0}")]
    Provider(String),
}
