use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::{LegalWorkflowStore, StoreError, VersionedState};
use crate::database::DatabaseManager;
use crate::domain::WorkflowStage;
use crate::workflows::LegalWorkflowState;

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Case state rows in the embedded database; versions are checked in the UPDATE itself
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(database: &DatabaseManager) -> Self {
        Self {
            pool: database.pool().clone(),
        }
    }

    async fn current_version(&self, case_id: &str) -> Result<u64, StoreError> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT version FROM legal_workflow_states WHERE case_id = ?1")
                .bind(case_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(version.unwrap_or(0) as u64)
    }

    fn conflict(case_id: &str, expected: u64, found: u64) -> StoreError {
        StoreError::VersionConflict {
            case_id: case_id.to_string(),
            expected,
            found,
        }
    }
}

fn row_to_state(row: &sqlx::sqlite::SqliteRow) -> Result<VersionedState, StoreError> {
    let case_id: String = row.get("case_id");
    let stage: String = row.get("stage");
    let version: i64 = row.get("version");
    let updated_at: String = row.get("updated_at");

    let stage = stage.parse::<WorkflowStage>().map_err(|e| StoreError::Corrupt {
        reason: format!("case {}: {}", case_id, e),
    })?;
    let updated_at = DateTime::parse_from_rfc3339(&updated_at)
        .map_err(|e| StoreError::Corrupt {
            reason: format!("case {}: bad timestamp: {}", case_id, e),
        })?
        .with_timezone(&Utc);

    Ok(VersionedState {
        state: LegalWorkflowState { case_id, stage },
        version: version as u64,
        updated_at,
    })
}

#[async_trait]
impl LegalWorkflowStore for SqliteStore {
    async fn load(&self, case_id: &str) -> Result<Option<VersionedState>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT case_id, stage, version, updated_at
            FROM legal_workflow_states
            WHERE case_id = ?1
            "#,
        )
        .bind(case_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_state).transpose()
    }

    async fn save(
        &self,
        state: &LegalWorkflowState,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError> {
        let now = Utc::now().to_rfc3339();

        let version = match expected_version {
            None => {
                let version: i64 = sqlx::query_scalar(
                    r#"
                    INSERT INTO legal_workflow_states (case_id, stage, version, updated_at)
                    VALUES (?1, ?2, 1, ?3)
                    ON CONFLICT(case_id) DO UPDATE SET
                        stage = excluded.stage,
                        version = legal_workflow_states.version + 1,
                        updated_at = excluded.updated_at
                    RETURNING version
                    "#,
                )
                .bind(&state.case_id)
                .bind(state.stage.as_str())
                .bind(&now)
                .fetch_one(&self.pool)
                .await?;
                version as u64
            }
            Some(0) => {
                let inserted = sqlx::query(
                    r#"
                    INSERT INTO legal_workflow_states (case_id, stage, version, updated_at)
                    VALUES (?1, ?2, 1, ?3)
                    ON CONFLICT(case_id) DO NOTHING
                    "#,
                )
                .bind(&state.case_id)
                .bind(state.stage.as_str())
                .bind(&now)
                .execute(&self.pool)
                .await?;

                if inserted.rows_affected() == 0 {
                    let found = self.current_version(&state.case_id).await?;
                    return Err(Self::conflict(&state.case_id, 0, found));
                }
                1
            }
            Some(expected) => {
                let updated = sqlx::query(
                    r#"
                    UPDATE legal_workflow_states
                    SET stage = ?2, version = version + 1, updated_at = ?3
                    WHERE case_id = ?1 AND version = ?4
                    "#,
                )
                .bind(&state.case_id)
                .bind(state.stage.as_str())
                .bind(&now)
                .bind(expected as i64)
                .execute(&self.pool)
                .await?;

                if updated.rows_affected() == 0 {
                    let found = self.current_version(&state.case_id).await?;
                    return Err(Self::conflict(&state.case_id, expected, found));
                }
                expected + 1
            }
        };

        debug!(case_id = %state.case_id, stage = %state.stage, version, "Saved case state row");
        Ok(version)
    }

    async fn delete(&self, case_id: &str) -> Result<bool, StoreError> {
        let deleted = sqlx::query("DELETE FROM legal_workflow_states WHERE case_id = ?1")
            .bind(case_id)
            .execute(&self.pool)
            .await?;
        Ok(deleted.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<VersionedState>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT case_id, stage, version, updated_at
            FROM legal_workflow_states
            ORDER BY case_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_state).collect()
    }
}
