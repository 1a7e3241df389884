use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

use super::{ConsultationRequest, ConsultationResponse, LegalAiError};
use crate::domain::WorkflowStage;

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait LegalAiClient: Send + Sync {
    async fn consult(&self, request: &ConsultationRequest) -> Result<ConsultationResponse, LegalAiError>;
}

/// Offline client returning a fixed readiness brief after a simulated delay
#[derive(Debug, Clone)]
pub struct CannedLegalAiClient {
    latency: Duration,
}

impl CannedLegalAiClient {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for CannedLegalAiClient {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

#[async_trait]
impl LegalAiClient for CannedLegalAiClient {
    async fn consult(&self, request: &ConsultationRequest) -> Result<ConsultationResponse, LegalAiError> {
        tokio::time::sleep(self.latency).await;

        Ok(ConsultationResponse {
            clarifying_questions: vec![
                format!(
                    "What is your target completion timeline for {}?",
                    request.country_code
                ),
                "Will the purchase be cash or financed, and do you already have proof of funds?"
                    .to_string(),
                "Are there any residency or usage requirements we should consider?".to_string(),
            ],
            readiness_summary: "We have a baseline brief. Next steps include confirming funds, \
                                gathering buyer identity documentation, and requesting the draft legal pack."
                .to_string(),
            recommended_next_stage: WorkflowStage::LegalPackRequested,
        })
    }
}

/// Bound any client call by `timeout`
pub async fn consult_with_timeout<C: LegalAiClient + ?Sized>(
    client: &C,
    request: &ConsultationRequest,
    timeout: Duration,
) -> Result<ConsultationResponse, LegalAiError> {
    match tokio::time::timeout(timeout, client.consult(request)).await {
        Ok(Ok(response)) => {
            info!(case_id = %request.case_id, "Legal AI consultation completed");
            Ok(response)
        }
        Ok(Err(e)) => {
            warn!(case_id = %request.case_id, error = %e, "Legal AI consultation failed");
            Err(e)
        }
        Err(_) => {
            warn!(case_id = %request.case_id, timeout_ms = timeout.as_millis() as u64, "Legal AI consultation timed out");
            Err(LegalAiError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }
}
