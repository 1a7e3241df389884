// Legal workflow service - binds the pure machine to a store and an audit sink
// The store's versioned save serializes concurrent advances of the same case

use thiserror::Error;
use tracing::{info, warn, Instrument};

use crate::audit::{AuditEvent, AuditSink, CASE_ADVANCED, CASE_OPENED, CASE_TRANSITION_REJECTED};
use crate::domain::{LegalCase, Offer};
use crate::store::{LegalWorkflowStore, StoreError, VersionedState};
use crate::telemetry::{create_case_span, generate_correlation_id};
use crate::validation::ValidationError;
use crate::workflows::legal::{open_case, step_for, try_transition, LegalWorkflowStep, TransitionOutcome};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Legal case not found: {case_id}")]
    CaseNotFound { case_id: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Another writer advanced the case first; reload and retry
    pub fn is_conflict(&self) -> bool {
        matches!(self, ServiceError::Store(e) if e.is_conflict())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseStatus {
    pub record: VersionedState,
    pub step: &'static LegalWorkflowStep,
}

pub struct LegalWorkflowService<S, A> {
    store: S,
    audit: A,
}

impl<S: LegalWorkflowStore, A: AuditSink> LegalWorkflowService<S, A> {
    pub fn new(store: S, audit: A) -> Self {
        Self { store, audit }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Failing to write the audit trail never undoes a persisted state change
    async fn audit(&self, event: AuditEvent) {
        if let Err(e) = self.audit.record(event).await {
            warn!(error = %e, "Failed to record audit event");
        }
    }

    /// Validate the offer, open a case at OfferCreated and persist it
    pub async fn open_case(&self, offer: &Offer, actor: Option<&str>) -> Result<LegalCase, ServiceError> {
        let correlation_id = generate_correlation_id();
        let span = create_case_span("open_case", None, actor, Some(&correlation_id));

        async {
            let case = open_case(offer)?;
            self.store.save(&case.workflow_state(), Some(0)).await?;

            info!(case_id = %case.id, offer_id = %offer.id, "Legal case opened");
            self.audit(
                AuditEvent::new(CASE_OPENED)
                    .with_case(&case.id)
                    .with_actor(actor)
                    .with_metadata("offer_id", &offer.id)
                    .with_metadata("property_id", &offer.property_id)
                    .with_metadata("correlation_id", &correlation_id),
            )
            .await;
            Ok(case)
        }
        .instrument(span)
        .await
    }

    /// Request a move to `target` (raw stage identifier).
    ///
    /// Rejections are returned as [`TransitionOutcome::Rejected`], not errors.
    /// A concurrent writer that saved first yields a version conflict error.
    pub async fn advance(
        &self,
        case_id: &str,
        target: &str,
        actor: Option<&str>,
    ) -> Result<TransitionOutcome, ServiceError> {
        let correlation_id = generate_correlation_id();
        let span = create_case_span("advance", Some(case_id), actor, Some(&correlation_id));

        async {
            let record = self.load_existing(case_id).await?;
            let outcome = try_transition(&record.state, target);

            match &outcome {
                TransitionOutcome::Applied { previous_stage, state } => {
                    if previous_stage != &state.stage {
                        let version = self.store.save(state, Some(record.version)).await?;
                        info!(
                            from_stage = %previous_stage,
                            to_stage = %state.stage,
                            version,
                            "Legal case advanced"
                        );
                        self.audit(
                            AuditEvent::new(CASE_ADVANCED)
                                .with_case(case_id)
                                .with_actor(actor)
                                .with_metadata("from", previous_stage)
                                .with_metadata("to", state.stage)
                                .with_metadata("version", version)
                                .with_metadata("correlation_id", &correlation_id),
                        )
                        .await;
                    }
                }
                TransitionOutcome::Rejected { state, reason } => {
                    warn!(stage = %state.stage, target = %target, reason = %reason, "Transition rejected");
                    self.audit(
                        AuditEvent::new(CASE_TRANSITION_REJECTED)
                            .with_case(case_id)
                            .with_actor(actor)
                            .with_metadata("stage", state.stage)
                            .with_metadata("target", target)
                            .with_metadata("reason", reason)
                            .with_metadata("correlation_id", &correlation_id),
                    )
                    .await;
                }
            }
            Ok(outcome)
        }
        .instrument(span)
        .await
    }

    pub async fn status(&self, case_id: &str) -> Result<CaseStatus, ServiceError> {
        let record = self.load_existing(case_id).await?;
        let step = step_for(record.state.stage);
        Ok(CaseStatus { record, step })
    }

    pub async fn list_cases(&self) -> Result<Vec<VersionedState>, ServiceError> {
        Ok(self.store.list().await?)
    }

    async fn load_existing(&self, case_id: &str) -> Result<VersionedState, ServiceError> {
        self.store
            .load(case_id)
            .await?
            .ok_or_else(|| ServiceError::CaseNotFound {
                case_id: case_id.to_string(),
            })
    }
}
