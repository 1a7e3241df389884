// Domain values shared by the workflow, store and service layers

pub mod currency;
pub mod legal;
pub mod offer;
pub mod playbook;

pub use currency::{validate_money, CurrencyCode, Money};
pub use legal::{LegalCase, UnknownStage, WorkflowStage};
pub use offer::{validate_offer, Offer, OfferStatus};
pub use playbook::{validate_playbook, LegalPlaybook};
