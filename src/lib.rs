// World Property Library - legal workflow for property purchases
// This exposes the core components for the CLI, tests and integration

pub mod audit;
pub mod config;
#[cfg(feature = "database")]
pub mod database;
pub mod domain;
pub mod fx;
pub mod legal_ai;
pub mod repository;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod validation;
pub mod workflows;

// Re-export key types for easy access
pub use audit::{AuditEvent, AuditSink, InMemoryAuditSink, JsonLinesAuditSink, TracingAuditSink};
pub use config::{StoreBackend, WorldPropertyConfig};
#[cfg(feature = "database")]
pub use database::DatabaseManager;
pub use domain::{LegalCase, LegalPlaybook, Money, Offer, OfferStatus, WorkflowStage};
pub use fx::{FxRates, FxService};
pub use service::{CaseStatus, LegalWorkflowService, ServiceError};
pub use store::{
    open_store, FileSystemStore, InMemoryStore, LegalWorkflowStore, StoreError, VersionedState,
};
pub use telemetry::{create_case_span, generate_correlation_id, init_telemetry, shutdown_telemetry};
pub use validation::{ValidationError, ValidationIssue, ValidationReport};
pub use workflows::legal::{
    open_case, stage_catalog, transition, try_transition, LegalWorkflowEvent, RejectionReason,
    LEGAL_WORKFLOW_EVENT_SEQUENCE, LEGAL_WORKFLOW_STEPS,
};
pub use workflows::{LegalWorkflowState, TransitionOutcome};
