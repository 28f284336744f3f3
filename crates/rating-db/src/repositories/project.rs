//! PostgreSQL implementation of ProjectRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use rating_core::entities::Project;
use rating_core::error::DomainError;
use rating_core::traits::{CategoryCount, ProjectQuery, ProjectRepository, ProjectSort, RepoResult};
use rating_core::value_objects::Snowflake;

use crate::models::{CategoryCountModel, ProjectModel};

use super::error::{map_db_error, map_unique_violation, project_not_found};

/// PostgreSQL implementation of ProjectRepository
#[derive(Clone)]
pub struct PgProjectRepository {
    pool: PgPool,
}

impl PgProjectRepository {
    /// Create a new PgProjectRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape LIKE wildcards and wrap in `%…%`
pub(crate) fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn order_clause(sort: ProjectSort) -> &'static str {
    match sort {
        ProjectSort::Score => "ORDER BY score DESC, id ASC",
        ProjectSort::Name => "ORDER BY name ASC, id ASC",
        ProjectSort::CreatedAt => "ORDER BY created_at DESC, id DESC",
    }
}

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Project>> {
        let result = sqlx::query_as::<_, ProjectModel>(
            r"
            SELECT id, name, category, description, score, created_at, updated_at, deleted_at
            FROM projects
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Project::from))
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Project>> {
        let result = sqlx::query_as::<_, ProjectModel>(
            r"
            SELECT id, name, category, description, score, created_at, updated_at, deleted_at
            FROM projects
            WHERE LOWER(name) = LOWER($1) AND deleted_at IS NULL
            ",
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Project::from))
    }

    #[instrument(skip(self, project), fields(project_id = %project.id))]
    async fn create(&self, project: &Project) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO projects (id, name, category, description, score, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 0, $5, $6)
            ",
        )
        .bind(project.id.into_inner())
        .bind(&project.name)
        .bind(&project.category)
        .bind(&project.description)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || DomainError::ProjectNameTaken(project.name.clone()))
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE projects
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(project_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, query: &ProjectQuery) -> RepoResult<Vec<Project>> {
        let sql = format!(
            r"
            SELECT id, name, category, description, score, created_at, updated_at, deleted_at
            FROM projects
            WHERE deleted_at IS NULL AND ($1::TEXT IS NULL OR category = $1)
            {}
            LIMIT $2 OFFSET $3
            ",
            order_clause(query.sort)
        );

        let results = sqlx::query_as::<_, ProjectModel>(&sql)
            .bind(query.category.as_deref())
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(results.into_iter().map(Project::from).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self, category: Option<&str>) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM projects
            WHERE deleted_at IS NULL AND ($1::TEXT IS NULL OR category = $1)
            ",
        )
        .bind(category)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: i64) -> RepoResult<Vec<Project>> {
        let results = sqlx::query_as::<_, ProjectModel>(
            r"
            SELECT id, name, category, description, score, created_at, updated_at, deleted_at
            FROM projects
            WHERE deleted_at IS NULL
              AND (name ILIKE $1 OR description ILIKE $1)
            ORDER BY score DESC, id ASC
            LIMIT $2
            ",
        )
        .bind(like_pattern(query.trim()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Project::from).collect())
    }

    #[instrument(skip(self))]
    async fn categories(&self) -> RepoResult<Vec<CategoryCount>> {
        let results = sqlx::query_as::<_, CategoryCountModel>(
            r"
            SELECT category, COUNT(*) AS count
            FROM projects
            WHERE deleted_at IS NULL
            GROUP BY category
            ORDER BY category ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(CategoryCount::from).collect())
    }
}
