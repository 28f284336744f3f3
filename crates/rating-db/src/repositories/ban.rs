//! PostgreSQL implementation of BanRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use rating_core::entities::Ban;
use rating_core::traits::{BanRepository, RepoResult};
use rating_core::value_objects::ActorId;

use crate::models::BanModel;

use super::error::map_db_error;

/// PostgreSQL implementation of BanRepository
#[derive(Clone)]
pub struct PgBanRepository {
    pool: PgPool,
}

impl PgBanRepository {
    /// Create a new PgBanRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BanRepository for PgBanRepository {
    #[instrument(skip(self))]
    async fn is_banned(&self, actor_id: ActorId) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(SELECT 1 FROM banned_actors WHERE actor_id = $1)
            ",
        )
        .bind(actor_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn find(&self, actor_id: ActorId) -> RepoResult<Option<Ban>> {
        let result = sqlx::query_as::<_, BanModel>(
            r"
            SELECT actor_id, reason, banned_by, created_at
            FROM banned_actors
            WHERE actor_id = $1
            ",
        )
        .bind(actor_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Ban::from))
    }

    #[instrument(skip(self))]
    async fn list(&self) -> RepoResult<Vec<Ban>> {
        let results = sqlx::query_as::<_, BanModel>(
            r"
            SELECT actor_id, reason, banned_by, created_at
            FROM banned_actors
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Ban::from).collect())
    }

    #[instrument(skip(self))]
    async fn create(&self, ban: &Ban) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO banned_actors (actor_id, reason, banned_by, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (actor_id) DO UPDATE SET reason = $2, banned_by = $3
            ",
        )
        .bind(ban.actor_id.into_inner())
        .bind(&ban.reason)
        .bind(ban.banned_by.into_inner())
        .bind(ban.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, actor_id: ActorId) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM banned_actors WHERE actor_id = $1")
            .bind(actor_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
