use async_trait::async_trait;
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use super::{next_version, LegalWorkflowStore, StoreError, VersionedState};
use crate::workflows::LegalWorkflowState;

const LOCK_FILE_NAME: &str = ".store.lock";
const MAX_CASE_ID_LEN: usize = 128;

/// One JSON document per case under a directory.
///
/// Writes go through a temp file and an atomic rename, so readers never see
/// a partial document. Check-and-set runs under an advisory lock on
/// `.store.lock`, which serializes writers across tasks and processes.
#[derive(Debug, Clone)]
pub struct FileSystemStore {
    directory: PathBuf,
}

impl FileSystemStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Get the state file path for a case, refusing ids that are unsafe as file names
    fn state_file_path(&self, case_id: &str) -> Result<PathBuf, StoreError> {
        let safe = !case_id.is_empty()
            && case_id.len() <= MAX_CASE_ID_LEN
            && case_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(StoreError::InvalidCaseId {
                case_id: case_id.to_string(),
            });
        }
        Ok(self.directory.join(format!("{}.json", case_id)))
    }

    fn lock_file_path(&self) -> PathBuf {
        self.directory.join(LOCK_FILE_NAME)
    }

    /// Run `op` on a blocking thread while holding the store's write lock
    async fn with_write_lock<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    {
        let directory = self.directory.clone();
        let lock_path = self.lock_file_path();

        tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&directory)?;
            let lock_file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .read(true)
                .write(true)
                .open(&lock_path)?;
            let mut lock = fd_lock::RwLock::new(lock_file);
            let _guard = lock.write()?;
            op()
        })
        .await
        .map_err(|e| StoreError::Backend(format!("Store task failed: {}", e)))?
    }
}

fn parse_state_file(path: &Path, bytes: &[u8]) -> Result<VersionedState, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupt {
        reason: format!("{}: {}", path.display(), e),
    })
}

/// A state file must hold the case it is named after
fn check_case_id(path: &Path, case_id: &str, record: VersionedState) -> Result<VersionedState, StoreError> {
    if record.state.case_id != case_id {
        return Err(StoreError::Corrupt {
            reason: format!("{} holds case {}", path.display(), record.state.case_id),
        });
    }
    Ok(record)
}

fn read_state_file(path: &Path) -> Result<Option<VersionedState>, StoreError> {
    match std::fs::read(path) {
        Ok(bytes) => parse_state_file(path, &bytes).map(Some),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl LegalWorkflowStore for FileSystemStore {
    async fn load(&self, case_id: &str) -> Result<Option<VersionedState>, StoreError> {
        let path = self.state_file_path(case_id)?;
        match fs::read(&path).await {
            Ok(bytes) => {
                let record = parse_state_file(&path, &bytes)?;
                Ok(Some(check_case_id(&path, case_id, record)?))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(
        &self,
        state: &LegalWorkflowState,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError> {
        let path = self.state_file_path(&state.case_id)?;
        let state = state.clone();

        let version = self
            .with_write_lock(move || {
                let current = read_state_file(&path)?.map(|v| v.version).unwrap_or(0);
                let version = next_version(&state.case_id, current, expected_version)?;

                let record = VersionedState {
                    state,
                    version,
                    updated_at: Utc::now(),
                };
                let tmp_path = path.with_extension("json.tmp");
                std::fs::write(&tmp_path, serde_json::to_vec_pretty(&record)?)?;
                std::fs::rename(&tmp_path, &path)?;
                Ok(version)
            })
            .await?;

        debug!(directory = %self.directory.display(), version, "Saved case state file");
        Ok(version)
    }

    async fn delete(&self, case_id: &str) -> Result<bool, StoreError> {
        let path = self.state_file_path(case_id)?;
        let removed = self
            .with_write_lock(move || match std::fs::remove_file(&path) {
                Ok(()) => Ok(true),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
                Err(e) => Err(e.into()),
            })
            .await?;

        if removed {
            info!(case_id = %case_id, "Deleted case state file");
        }
        Ok(removed)
    }

    async fn list(&self) -> Result<Vec<VersionedState>, StoreError> {
        let mut entries = match fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut states = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(case_id) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let bytes = match fs::read(&path).await {
                Ok(bytes) => bytes,
                // Deleted since read_dir
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            match parse_state_file(&path, &bytes).and_then(|record| check_case_id(&path, case_id, record)) {
                Ok(record) => states.push(record),
                Err(e) => warn!(error = %e, "Skipping unreadable case state file"),
            }
        }

        states.sort_by(|a, b| a.state.case_id.cmp(&b.state.case_id));
        Ok(states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkflowStage;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn filesystem_store_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSystemStore::new(temp_dir.path().join("cases"));
        let state = LegalWorkflowState::new("case-1", WorkflowStage::OfferCreated);

        assert!(store.load("case-1").await.unwrap().is_none());
        assert_eq!(store.save(&state, Some(0)).await.unwrap(), 1);

        let loaded = store.load("case-1").await.unwrap().unwrap();
        assert_eq!(loaded.state, state);
        assert_eq!(loaded.version, 1);
    }

    #[tokio::test]
    async fn state_survives_a_new_store_instance() {
        let temp_dir = TempDir::new().unwrap();
        let state = LegalWorkflowState::new("case-7", WorkflowStage::DueDiligence);
        FileSystemStore::new(temp_dir.path()).save(&state, None).await.unwrap();

        let reopened = FileSystemStore::new(temp_dir.path());
        let loaded = reopened.load("case-7").await.unwrap().unwrap();
        assert_eq!(loaded.state.stage, WorkflowStage::DueDiligence);
    }

    #[tokio::test]
    async fn conflicting_save_leaves_file_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSystemStore::new(temp_dir.path());
        let state = LegalWorkflowState::new("case-1", WorkflowStage::OfferCreated);
        store.save(&state, Some(0)).await.unwrap();

        let advanced = LegalWorkflowState::new("case-1", WorkflowStage::AiConsultation);
        let err = store.save(&advanced, Some(0)).await.unwrap_err();
        assert!(err.is_conflict());

        let loaded = store.load("case-1").await.unwrap().unwrap();
        assert_eq!(loaded.state.stage, WorkflowStage::OfferCreated);
    }

    #[tokio::test]
    async fn concurrent_saves_serialize_under_the_lock() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(FileSystemStore::new(temp_dir.path()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .save(&LegalWorkflowState::new("case-1", WorkflowStage::OfferCreated), None)
                    .await
            }));
        }

        let mut versions = Vec::new();
        for handle in handles {
            versions.push(handle.await.unwrap().unwrap());
        }
        versions.sort();
        assert_eq!(versions, (1..=8).collect::<Vec<u64>>());
        assert_eq!(store.load("case-1").await.unwrap().unwrap().version, 8);
    }

    #[tokio::test]
    async fn unsafe_case_ids_are_refused() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSystemStore::new(temp_dir.path());

        let err = store.load("../etc/passwd").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidCaseId { .. }));

        let state = LegalWorkflowState::new("", WorkflowStage::OfferCreated);
        assert!(store.save(&state, None).await.is_err());
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("case-9.json"), b"{ not json").unwrap();

        let store = FileSystemStore::new(temp_dir.path());
        let err = store.load("case-9").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_and_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSystemStore::new(temp_dir.path());
        assert!(store.list().await.unwrap().is_empty());

        for id in ["case-b", "case-a"] {
            store
                .save(&LegalWorkflowState::new(id, WorkflowStage::OfferCreated), None)
                .await
                .unwrap();
        }
        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|v| v.state.case_id).collect();
        assert_eq!(ids, vec!["case-a", "case-b"]);

        assert!(store.delete("case-a").await.unwrap());
        assert!(!store.delete("case-a").await.unwrap());
        assert!(store.load("case-a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_skips_files_named_after_another_case() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSystemStore::new(temp_dir.path());
        store
            .save(&LegalWorkflowState::new("case-1", WorkflowStage::Contracts), None)
            .await
            .unwrap();
        std::fs::copy(temp_dir.path().join("case-1.json"), temp_dir.path().join("case-2.json")).unwrap();

        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|v| v.state.case_id).collect();
        assert_eq!(ids, vec!["case-1"]);
        assert!(matches!(store.load("case-2").await, Err(StoreError::Corrupt { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn list_skips_files_that_vanish() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSystemStore::new(temp_dir.path());
        store
            .save(&LegalWorkflowState::new("case-1", WorkflowStage::OfferCreated), None)
            .await
            .unwrap();
        // Listed by read_dir, but reading it finds nothing
        std::os::unix::fs::symlink(temp_dir.path().join("gone.json"), temp_dir.path().join("case-3.json"))
            .unwrap();

        let states = store.list().await.unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].state.case_id, "case-1");
    }
}
