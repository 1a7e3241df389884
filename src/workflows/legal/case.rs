// Case creation - one offer opens one legal case at OfferCreated

use chrono::Utc;
use uuid::Uuid;

use super::machine::LegalWorkflowState;
use crate::domain::{validate_offer, LegalCase, Offer, WorkflowStage};
use crate::validation::{ValidationError, ValidationReport};

/// Open a new case for `offer` with a fresh, never reused case id.
///
/// Offer issues are reported under the `offer.` prefix.
pub fn open_case(offer: &Offer) -> Result<LegalCase, ValidationError> {
    let mut report = ValidationReport::new();
    report.merge_prefixed("offer", validate_offer(offer));
    report.into_result()?;

    Ok(LegalCase {
        id: Uuid::new_v4().to_string(),
        property_id: offer.property_id.clone(),
        offer_id: offer.id.clone(),
        stage: WorkflowStage::OfferCreated,
        created_at: Utc::now(),
    })
}

impl LegalCase {
    pub fn workflow_state(&self) -> LegalWorkflowState {
        LegalWorkflowState::new(self.id.clone(), self.stage)
    }
}
