// Purchase flow session state - support mode, active offer, case stage, checklist and messages
// Stage changes go through the legal workflow machine; nothing writes a stage directly

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{KeyValueStore, RepositoryError};
use crate::domain::{Offer, WorkflowStage};
use crate::workflows::legal::{try_transition, LegalWorkflowState, TransitionOutcome};

pub const PURCHASE_FLOW_KEY: &str = "wp_purchase_flow";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportMode {
    #[default]
    Human,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageAuthor {
    System,
    Ai,
    Buyer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseFlowMessage {
    pub id: String,
    pub author: MessageAuthor,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseFlowSnapshot {
    pub selected_support_mode: SupportMode,
    pub active_offer: Option<Offer>,
    pub legal_case_id: Option<String>,
    pub workflow_stage: WorkflowStage,
    pub checklist: Vec<String>,
    pub messages: Vec<PurchaseFlowMessage>,
}

impl PurchaseFlowSnapshot {
    /// Decode a stored value field by field; any field that does not parse keeps its default
    pub fn from_value_lenient(value: &Value) -> Self {
        let defaults = Self::default();
        let Some(object) = value.as_object() else {
            return defaults;
        };

        fn field<T: DeserializeOwned>(object: &serde_json::Map<String, Value>, name: &str) -> Option<T> {
            object
                .get(name)
                .and_then(|v| serde_json::from_value(v.clone()).ok())
        }

        Self {
            selected_support_mode: field(object, "selected_support_mode")
                .unwrap_or(defaults.selected_support_mode),
            active_offer: field::<Option<Offer>>(object, "active_offer").flatten(),
            legal_case_id: field::<Option<String>>(object, "legal_case_id").flatten(),
            workflow_stage: field(object, "workflow_stage").unwrap_or(defaults.workflow_stage),
            checklist: field(object, "checklist").unwrap_or(defaults.checklist),
            messages: field(object, "messages").unwrap_or(defaults.messages),
        }
    }
}

/// Persists the purchase flow snapshot on every mutation.
///
/// Mutations through one repository are serialized, so concurrent callers never
/// overwrite each other's changes.
pub struct PurchaseFlowRepository {
    store: Arc<dyn KeyValueStore>,
    update_lock: Mutex<()>,
}

impl PurchaseFlowRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            update_lock: Mutex::new(()),
        }
    }

    pub async fn load(&self) -> Result<PurchaseFlowSnapshot, RepositoryError> {
        let snapshot = match self.store.get(PURCHASE_FLOW_KEY).await? {
            Some(value) => PurchaseFlowSnapshot::from_value_lenient(&value),
            None => PurchaseFlowSnapshot::default(),
        };
        Ok(snapshot)
    }

    async fn persist(&self, snapshot: &PurchaseFlowSnapshot) -> Result<(), RepositoryError> {
        self.store
            .set(PURCHASE_FLOW_KEY, serde_json::to_value(snapshot)?)
            .await
    }

    async fn update<F>(&self, mutate: F) -> Result<PurchaseFlowSnapshot, RepositoryError>
    where
        F: FnOnce(&mut PurchaseFlowSnapshot),
    {
        let _guard = self.update_lock.lock().await;
        let mut snapshot = self.load().await?;
        mutate(&mut snapshot);
        self.persist(&snapshot).await?;
        Ok(snapshot)
    }

    pub async fn set_support_mode(&self, mode: SupportMode) -> Result<PurchaseFlowSnapshot, RepositoryError> {
        self.update(|s| s.selected_support_mode = mode).await
    }

    /// Attach a newly opened case; the session stage restarts at OfferCreated
    pub async fn set_active_offer(
        &self,
        offer: Offer,
        case_id: &str,
    ) -> Result<PurchaseFlowSnapshot, RepositoryError> {
        self.update(|s| {
            s.active_offer = Some(offer);
            s.legal_case_id = Some(case_id.to_string());
            s.workflow_stage = WorkflowStage::OfferCreated;
        })
        .await
    }

    /// Request a stage change for the session's case; rejected requests leave the snapshot as is
    pub async fn set_workflow_stage(&self, target: &str) -> Result<TransitionOutcome, RepositoryError> {
        let _guard = self.update_lock.lock().await;
        let mut snapshot = self.load().await?;
        let case_id = snapshot
            .legal_case_id
            .clone()
            .ok_or(RepositoryError::NoActiveCase)?;

        let current = LegalWorkflowState::new(case_id, snapshot.workflow_stage);
        let outcome = try_transition(&current, target);
        match &outcome {
            TransitionOutcome::Applied { state, .. } => {
                snapshot.workflow_stage = state.stage;
                self.persist(&snapshot).await?;
                debug!(case_id = %state.case_id, stage = %state.stage, "Purchase flow stage updated");
            }
            TransitionOutcome::Rejected { reason, .. } => {
                warn!(reason = %reason, "Purchase flow stage change rejected");
            }
        }
        Ok(outcome)
    }

    pub async fn set_checklist(&self, items: Vec<String>) -> Result<PurchaseFlowSnapshot, RepositoryError> {
        self.update(|s| s.checklist = items).await
    }

    pub async fn add_message(
        &self,
        message: PurchaseFlowMessage,
    ) -> Result<PurchaseFlowSnapshot, RepositoryError> {
        self.update(|s| s.messages.push(message)).await
    }

    pub async fn reset_flow(&self) -> Result<PurchaseFlowSnapshot, RepositoryError> {
        let _guard = self.update_lock.lock().await;
        let snapshot = PurchaseFlowSnapshot::default();
        self.persist(&snapshot).await?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{FileKeyValueStore, MemoryKeyValueStore};
    use serde_json::json;
    use tempfile::TempDir;

    fn repository() -> (Arc<MemoryKeyValueStore>, PurchaseFlowRepository) {
        let store = Arc::new(MemoryKeyValueStore::new());
        (store.clone(), PurchaseFlowRepository::new(store))
    }

    #[tokio::test]
    async fn empty_store_yields_defaults() {
        let (_, repo) = repository();
        let snapshot = repo.load().await.unwrap();
        assert_eq!(snapshot, PurchaseFlowSnapshot::default());
        assert_eq!(snapshot.selected_support_mode, SupportMode::Human);
        assert_eq!(snapshot.workflow_stage, WorkflowStage::OfferCreated);
    }

    #[tokio::test]
    async fn malformed_fields_fall_back_individually() {
        let (store, repo) = repository();
        store
            .set(
                PURCHASE_FLOW_KEY,
                json!({
                    "selected_support_mode": "ai",
                    "legal_case_id": "case-1",
                    "workflow_stage": "Nowhere",
                    "checklist": "not a list",
                    "messages": [],
                }),
            )
            .await
            .unwrap();

        let snapshot = repo.load().await.unwrap();
        assert_eq!(snapshot.selected_support_mode, SupportMode::Ai);
        assert_eq!(snapshot.legal_case_id.as_deref(), Some("case-1"));
        assert_eq!(snapshot.workflow_stage, WorkflowStage::OfferCreated);
        assert!(snapshot.checklist.is_empty());
    }

    #[tokio::test]
    async fn stage_changes_follow_the_workflow() {
        let (_, repo) = repository();
        let offer = Offer::new("offer-1", "prop-1", 100_000, "GBP");
        repo.set_active_offer(offer, "case-1").await.unwrap();

        let outcome = repo.set_workflow_stage("AIConsultation").await.unwrap();
        assert!(outcome.is_applied());

        let outcome = repo.set_workflow_stage("Completion").await.unwrap();
        assert!(!outcome.is_applied());

        let snapshot = repo.load().await.unwrap();
        assert_eq!(snapshot.workflow_stage, WorkflowStage::AiConsultation);
    }

    #[tokio::test]
    async fn stage_change_without_case_is_an_error() {
        let (_, repo) = repository();
        let err = repo.set_workflow_stage("AIConsultation").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NoActiveCase));
    }

    #[tokio::test]
    async fn mutations_persist_and_reset_clears() {
        let (_, repo) = repository();
        repo.set_support_mode(SupportMode::Ai).await.unwrap();
        repo.set_checklist(vec!["Appoint a solicitor".to_string()]).await.unwrap();
        repo.add_message(PurchaseFlowMessage {
            id: "m-1".to_string(),
            author: MessageAuthor::Buyer,
            content: "Is the lease over 90 years?".to_string(),
            created_at: Utc::now(),
        })
        .await
        .unwrap();

        let snapshot = repo.load().await.unwrap();
        assert_eq!(snapshot.selected_support_mode, SupportMode::Ai);
        assert_eq!(snapshot.checklist.len(), 1);
        assert_eq!(snapshot.messages[0].author, MessageAuthor::Buyer);

        repo.reset_flow().await.unwrap();
        assert_eq!(repo.load().await.unwrap(), PurchaseFlowSnapshot::default());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_messages_are_all_kept() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(FileKeyValueStore::new(temp_dir.path().join("session.json")));
        let repo = Arc::new(PurchaseFlowRepository::new(store.clone()));

        let mut handles = Vec::new();
        for i in 0..16 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.add_message(PurchaseFlowMessage {
                    id: format!("m-{i}"),
                    author: MessageAuthor::Buyer,
                    content: format!("Question {i}"),
                    created_at: Utc::now(),
                })
                .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let reopened = PurchaseFlowRepository::new(store);
        let snapshot = reopened.load().await.unwrap();
        assert_eq!(snapshot.messages.len(), 16);

        let mut ids: Vec<String> = snapshot.messages.into_iter().map(|m| m.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 16);
    }
}
