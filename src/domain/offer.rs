// Offer domain - the buyer's proposed price that opens a legal case

use serde::{Deserialize, Serialize};
use std::fmt;

use super::currency::{validate_currency_code, Money};
use crate::validation::ValidationReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Created,
    Accepted,
    Rejected,
    Withdrawn,
}

impl OfferStatus {
    /// Only a freshly created offer can change status; every other status is final
    pub fn can_transition_to(&self, target: OfferStatus) -> bool {
        use OfferStatus::*;

        matches!(
            (self, target),
            (Created, Accepted) | (Created, Rejected) | (Created, Withdrawn)
        )
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OfferStatus::Created)
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected => write!(f, "rejected"),
            Self::Withdrawn => write!(f, "withdrawn"),
        }
    }
}

/// Owned by the caller; the legal workflow only reads it when a case is opened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: String,
    pub property_id: String,
    pub amount_minor: i64,
    pub currency_code: String,
    pub status: OfferStatus,
}

impl Offer {
    /// The currency code is stored trimmed
    pub fn new(
        id: impl Into<String>,
        property_id: impl Into<String>,
        amount_minor: i64,
        currency_code: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            property_id: property_id.into(),
            amount_minor,
            currency_code: currency_code.into().trim().to_string(),
            status: OfferStatus::Created,
        }
    }

    pub fn money(&self) -> Money {
        Money::new(self.amount_minor, self.currency_code.clone())
    }
}

const MAX_ID_LEN: usize = 128;

pub fn validate_offer(offer: &Offer) -> ValidationReport {
    let mut report = ValidationReport::new();
    report.check_text("id", &offer.id, MAX_ID_LEN);
    report.check_text("property_id", &offer.property_id, MAX_ID_LEN);
    if offer.amount_minor <= 0 {
        report.push("amount_minor", "must be positive");
    }
    validate_currency_code("currency_code", &offer.currency_code, &mut report);
    report
}
