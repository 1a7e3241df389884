// Prompt templates kept apart from any provider-specific concerns

use super::ConsultationRequest;

pub const CONSULTATION_SYSTEM_PROMPT: &str = "You are a legal workflow coordinator that summarizes readiness, \
collects missing documents, and flags risks. Keep responses structured, concise, and risk-aware.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBundle {
    pub system: String,
    pub user: String,
}

pub fn build_consultation_prompts(request: &ConsultationRequest) -> PromptBundle {
    let context = request.context_summary.trim();
    let context = if context.is_empty() {
        "none provided"
    } else {
        context
    };

    PromptBundle {
        system: CONSULTATION_SYSTEM_PROMPT.to_string(),
        user: format!(
            "Create a readiness summary for case {} in {}. Current stage: {}. Context: {}. \
             Provide clarifying questions and the next recommended stage.",
            request.case_id, request.country_code, request.stage, context
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkflowStage;

    #[test]
    fn user_prompt_carries_case_details() {
        let request = ConsultationRequest {
            case_id: "case-1".to_string(),
            stage: WorkflowStage::AiConsultation,
            country_code: "PT".to_string(),
            context_summary: "Cash buyer, Lisbon apartment".to_string(),
        };

        let prompts = build_consultation_prompts(&request);
        assert_eq!(prompts.system, CONSULTATION_SYSTEM_PROMPT);
        assert!(prompts.user.contains("case case-1 in PT"));
        assert!(prompts.user.contains("Current stage: AIConsultation"));
        assert!(prompts.user.contains("Context: Cash buyer, Lisbon apartment."));
    }

    #[test]
    fn blank_context_is_marked() {
        let request = ConsultationRequest {
            case_id: "case-1".to_string(),
            stage: WorkflowStage::OfferCreated,
            country_code: "GB".to_string(),
            context_summary: "  ".to_string(),
        };

        assert!(build_consultation_prompts(&request).user.contains("Context: none provided."));
    }
}
