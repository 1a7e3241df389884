use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{next_version, LegalWorkflowStore, StoreError, VersionedState};
use crate::workflows::LegalWorkflowState;

/// Process-local store; the write lock makes each check-and-set atomic
#[derive(Debug, Default)]
pub struct InMemoryStore {
    cases: RwLock<HashMap<String, VersionedState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LegalWorkflowStore for InMemoryStore {
    async fn load(&self, case_id: &str) -> Result<Option<VersionedState>, StoreError> {
        Ok(self.cases.read().await.get(case_id).cloned())
    }

    async fn save(
        &self,
        state: &LegalWorkflowState,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError> {
        let mut cases = self.cases.write().await;
        let current = cases.get(&state.case_id).map(|v| v.version).unwrap_or(0);
        let version = next_version(&state.case_id, current, expected_version)?;

        cases.insert(
            state.case_id.clone(),
            VersionedState {
                state: state.clone(),
                version,
                updated_at: Utc::now(),
            },
        );
        debug!(case_id = %state.case_id, stage = %state.stage, version, "Saved case state in memory");
        Ok(version)
    }

    async fn delete(&self, case_id: &str) -> Result<bool, StoreError> {
        Ok(self.cases.write().await.remove(case_id).is_some())
    }

    async fn list(&self) -> Result<Vec<VersionedState>, StoreError> {
        let mut all: Vec<_> = self.cases.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.state.case_id.cmp(&b.state.case_id));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkflowStage;
    use std::sync::Arc;

    #[tokio::test]
    async fn save_is_visible_to_next_load() {
        let store = InMemoryStore::new();
        let state = LegalWorkflowState::new("case-1", WorkflowStage::OfferCreated);

        let version = store.save(&state, Some(0)).await.unwrap();
        assert_eq!(version, 1);

        let loaded = store.load("case-1").await.unwrap().unwrap();
        assert_eq!(loaded.state, state);
        assert_eq!(loaded.version, 1);
        assert!(store.load("case-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stale_version_is_rejected() {
        let store = InMemoryStore::new();
        let state = LegalWorkflowState::new("case-1", WorkflowStage::OfferCreated);
        store.save(&state, Some(0)).await.unwrap();

        let advanced = LegalWorkflowState::new("case-1", WorkflowStage::AiConsultation);
        store.save(&advanced, Some(1)).await.unwrap();

        let err = store.save(&advanced, Some(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { expected: 1, found: 2, .. }));

        let err = store.save(&state, Some(0)).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn concurrent_optimistic_saves_admit_exactly_one_writer() {
        let store = Arc::new(InMemoryStore::new());
        store
            .save(&LegalWorkflowState::new("case-1", WorkflowStage::OfferCreated), Some(0))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .save(&LegalWorkflowState::new("case-1", WorkflowStage::AiConsultation), Some(1))
                    .await
            }));
        }

        let mut applied = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);
        assert_eq!(store.load("case-1").await.unwrap().unwrap().version, 2);
    }

    #[tokio::test]
    async fn last_writer_wins_without_expected_version() {
        let store = InMemoryStore::new();
        store
            .save(&LegalWorkflowState::new("case-1", WorkflowStage::OfferCreated), None)
            .await
            .unwrap();
        store
            .save(&LegalWorkflowState::new("case-1", WorkflowStage::AiConsultation), None)
            .await
            .unwrap();

        let loaded = store.load("case-1").await.unwrap().unwrap();
        assert_eq!(loaded.state.stage, WorkflowStage::AiConsultation);
        assert_eq!(loaded.version, 2);
    }

    #[tokio::test]
    async fn delete_and_list() {
        let store = InMemoryStore::new();
        for id in ["b", "a"] {
            store
                .save(&LegalWorkflowState::new(id, WorkflowStage::OfferCreated), None)
                .await
                .unwrap();
        }

        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|v| v.state.case_id).collect();
        assert_eq!(ids, vec!["a", "b"]);

        assert!(store.delete("a").await.unwrap());
        assert!(!store.delete("a").await.unwrap());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[test]
    fn missing_case_loads_as_none() {
        tokio_test::block_on(async {
            let store = InMemoryStore::new();
            assert!(store.load("nope").await.unwrap().is_none());
            assert!(!store.delete("nope").await.unwrap());
        });
    }
}
