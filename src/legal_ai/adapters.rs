// Mapping between provider payloads and the shared consultation contracts

use serde_json::{json, Value};

use super::prompts::build_consultation_prompts;
use super::{ConsultationRequest, ConsultationResponse, LegalAiError};

pub trait LegalAiAdapter: Send + Sync {
    fn to_provider_payload(&self, request: &ConsultationRequest) -> Value;

    fn from_provider_payload(&self, payload: &Value) -> Result<ConsultationResponse, LegalAiError>;
}

/// Chat-style JSON payloads: a message list out, a structured object back
#[derive(Debug, Clone)]
pub struct JsonPayloadAdapter {
    pub model: String,
}

impl Default for JsonPayloadAdapter {
    fn default() -> Self {
        Self {
            model: "legal-coordinator".to_string(),
        }
    }
}

impl LegalAiAdapter for JsonPayloadAdapter {
    fn to_provider_payload(&self, request: &ConsultationRequest) -> Value {
        let prompts = build_consultation_prompts(request);
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": prompts.system },
                { "role": "user", "content": prompts.user },
            ],
            "metadata": { "case_id": request.case_id },
        })
    }

    fn from_provider_payload(&self, payload: &Value) -> Result<ConsultationResponse, LegalAiError> {
        // Providers report failures as {"error": {"message": ...}}
        if let Some(error) = payload.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(LegalAiError::Provider(message));
        }

        let response: ConsultationResponse = serde_json::from_value(payload.clone())
            .map_err(|e| LegalAiError::MalformedPayload(e.to_string()))?;

        if response.readiness_summary.trim().is_empty() {
            return Err(LegalAiError::MalformedPayload(
                "readiness_summary is empty".to_string(),
            ));
        }
        Ok(response)
    }
}
