//! PostgreSQL implementation of HistoryRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{info, instrument};

use rating_core::entities::HistoryRecord;
use rating_core::traits::{HistoryRepository, RepoResult};
use rating_core::value_objects::Snowflake;

use crate::models::HistoryModel;

use super::error::map_db_error;

/// PostgreSQL implementation of HistoryRepository
#[derive(Clone)]
pub struct PgHistoryRepository {
    pool: PgPool,
}

impl PgHistoryRepository {
    /// Create a new PgHistoryRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryRepository for PgHistoryRepository {
    #[instrument(skip(self))]
    async fn find_by_project(
        &self,
        project_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<HistoryRecord>> {
        let results = sqlx::query_as::<_, HistoryModel>(
            r"
            SELECT id, project_id, actor_id, admin_id, kind, score_before, score_after, delta,
                   reason, is_admin_action, related_action_id, created_at
            FROM rating_history
            WHERE project_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(project_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(HistoryRecord::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn archive_before(&self, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO rating_history_archive
                (id, project_id, actor_id, admin_id, kind, score_before, score_after, delta,
                 reason, is_admin_action, related_action_id, created_at)
            SELECT id, project_id, actor_id, admin_id, kind, score_before, score_after, delta,
                   reason, is_admin_action, related_action_id, created_at
            FROM rating_history
            WHERE created_at < $1
            ON CONFLICT (id) DO NOTHING
            ",
        )
        .bind(cutoff)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let moved = sqlx::query("DELETE FROM rating_history WHERE created_at < $1")
            .bind(cutoff)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?
            .rows_affected();

        tx.commit().await.map_err(map_db_error)?;

        if moved > 0 {
            info!(moved, %cutoff, "Archived rating history");
        }
        Ok(moved)
    }

    #[instrument(skip(self))]
    async fn count_archived(&self) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rating_history_archive")
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}
