// Workflow modules
// Transitions are pure; persistence and audit happen in the service layer

pub mod legal;

pub use legal::{LegalWorkflowState, TransitionOutcome};
