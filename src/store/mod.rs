// Legal workflow state stores
// Every store gives read-your-writes per case id and versioned check-and-set saves

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{StoreBackend, WorldPropertyConfig};
use crate::workflows::LegalWorkflowState;

pub mod filesystem;
pub mod memory;
#[cfg(feature = "database")]
pub mod sqlite;

pub use filesystem::FileSystemStore;
pub use memory::InMemoryStore;
#[cfg(feature = "database")]
pub use sqlite::SqliteStore;

/// Errors that can occur while loading or saving case state
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Version conflict for case {case_id}: expected {expected}, found {found}")]
    VersionConflict {
        case_id: String,
        expected: u64,
        found: u64,
    },

    #[error("Invalid case id: {case_id}")]
    InvalidCaseId { case_id: String },

    #[error("Stored state is corrupt: {reason}")]
    Corrupt { reason: String },

    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::VersionConflict { .. })
    }
}

/// Case state together with its optimistic-concurrency version.
///
/// Versions start at 1 on first save; an absent record counts as version 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedState {
    pub state: LegalWorkflowState,
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

/// Load/save contract for persisted case state.
///
/// `save` with `expected_version = None` is last-writer-wins. With
/// `Some(v)` the save only succeeds when the stored version is `v`
/// (use `Some(0)` to create a case that must not exist yet), otherwise it
/// fails with [`StoreError::VersionConflict`]. Returns the new version.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait LegalWorkflowStore: Send + Sync {
    async fn load(&self, case_id: &str) -> Result<Option<VersionedState>, StoreError>;

    async fn save(
        &self,
        state: &LegalWorkflowState,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError>;

    async fn delete(&self, case_id: &str) -> Result<bool, StoreError>;

    async fn list(&self) -> Result<Vec<VersionedState>, StoreError>;
}

#[async_trait]
impl<T: LegalWorkflowStore + ?Sized> LegalWorkflowStore for Arc<T> {
    async fn load(&self, case_id: &str) -> Result<Option<VersionedState>, StoreError> {
        (**self).load(case_id).await
    }

    async fn save(
        &self,
        state: &LegalWorkflowState,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError> {
        (**self).save(state, expected_version).await
    }

    async fn delete(&self, case_id: &str) -> Result<bool, StoreError> {
        (**self).delete(case_id).await
    }

    async fn list(&self) -> Result<Vec<VersionedState>, StoreError> {
        (**self).list().await
    }
}

/// Shared check-and-set rule: compute the next version or report the conflict
pub(crate) fn next_version(
    case_id: &str,
    current: u64,
    expected: Option<u64>,
) -> Result<u64, StoreError> {
    match expected {
        Some(expected) if expected != current => Err(StoreError::VersionConflict {
            case_id: case_id.to_string(),
            expected,
            found: current,
        }),
        _ => Ok(current + 1),
    }
}

/// Build the store selected by configuration
pub async fn open_store(config: &WorldPropertyConfig) -> anyhow::Result<Arc<dyn LegalWorkflowStore>> {
    match config.store.backend {
        StoreBackend::Memory => Ok(Arc::new(InMemoryStore::new())),
        StoreBackend::File => Ok(Arc::new(FileSystemStore::new(&config.store.directory))),
        StoreBackend::Sqlite => open_sqlite_store(config).await,
    }
}

#[cfg(feature = "database")]
async fn open_sqlite_store(config: &WorldPropertyConfig) -> anyhow::Result<Arc<dyn LegalWorkflowStore>> {
    let database_config = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("store.backend = \"sqlite\" requires a [database] section"))?;
    let database = crate::database::DatabaseManager::from_config(database_config).await?;
    Ok(Arc::new(SqliteStore::new(&database)))
}

#[cfg(not(feature = "database"))]
async fn open_sqlite_store(_config: &WorldPropertyConfig) -> anyhow::Result<Arc<dyn LegalWorkflowStore>> {
    anyhow::bail!("store.backend = \"sqlite\" requires building with the `database` feature")
}
