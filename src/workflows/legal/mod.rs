pub mod case;
pub mod events;
pub mod machine;
pub mod steps;

pub use case::open_case;
pub use events::{LegalWorkflowEvent, LEGAL_WORKFLOW_EVENT_SEQUENCE};
pub use machine::{
    apply_event, transition, transition_to, try_transition, LegalWorkflowState, RejectionReason,
    TransitionOutcome,
};
pub use steps::{stage_catalog, step_for, LegalWorkflowStep, LEGAL_WORKFLOW_STEPS};
