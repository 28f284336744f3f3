//! PostgreSQL implementation of ActionRepository (read side)

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use rating_core::entities::{Action, ActionKind};
use rating_core::traits::{ActionRepository, RepoResult};
use rating_core::value_objects::{ActorId, Snowflake};

use crate::mappers::actions_from_models;
use crate::models::ActionModel;

use super::error::map_db_error;

/// PostgreSQL implementation of ActionRepository
#[derive(Clone)]
pub struct PgActionRepository {
    pool: PgPool,
}

impl PgActionRepository {
    /// Create a new PgActionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActionRepository for PgActionRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Action>> {
        let result = sqlx::query_as::<_, ActionModel>(
            r"
            SELECT id, actor_id, project_id, kind, text, stars, delta, reason, created_at, updated_at
            FROM rating_actions
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Action::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_contribution(
        &self,
        actor_id: ActorId,
        project_id: Snowflake,
        kind: ActionKind,
    ) -> RepoResult<Option<Action>> {
        let result = sqlx::query_as::<_, ActionModel>(
            r"
            SELECT id, actor_id, project_id, kind, text, stars, delta, reason, created_at, updated_at
            FROM rating_actions
            WHERE actor_id = $1 AND project_id = $2 AND kind = $3
            ORDER BY id ASC
            LIMIT 1
            ",
        )
        .bind(actor_id.into_inner())
        .bind(project_id.into_inner())
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Action::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn reviews_for_project(
        &self,
        project_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<Action>> {
        let results = sqlx::query_as::<_, ActionModel>(
            r"
            SELECT id, actor_id, project_id, kind, text, stars, delta, reason, created_at, updated_at
            FROM rating_actions
            WHERE project_id = $1 AND kind = 'review'
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(project_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        actions_from_models(results)
    }

    #[instrument(skip(self))]
    async fn count_by_kind(
        &self,
        project_id: Option<Snowflake>,
        kind: ActionKind,
    ) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM rating_actions a
            JOIN projects p ON p.id = a.project_id AND p.deleted_at IS NULL
            WHERE a.kind = $1 AND ($2::BIGINT IS NULL OR a.project_id = $2)
            ",
        )
        .bind(kind.as_str())
        .bind(project_id.map(Snowflake::into_inner))
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn find_by_actor(&self, actor_id: ActorId, kind: ActionKind) -> RepoResult<Vec<Action>> {
        let results = sqlx::query_as::<_, ActionModel>(
            r"
            SELECT a.id, a.actor_id, a.project_id, a.kind, a.text, a.stars, a.delta, a.reason,
                   a.created_at, a.updated_at
            FROM rating_actions a
            JOIN projects p ON p.id = a.project_id AND p.deleted_at IS NULL
            WHERE a.actor_id = $1 AND a.kind = $2
            ORDER BY a.created_at DESC, a.id DESC
            ",
        )
        .bind(actor_id.into_inner())
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        actions_from_models(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgActionRepository>();
    }
}
