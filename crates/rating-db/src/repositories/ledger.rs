//! PostgreSQL implementation of LedgerStore
//!
//! Every commit is one transaction: lock the project row, read the prior
//! action, plan, write the action row, bump the score, append history.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, instrument};

use rating_core::entities::{Action, ActionKind};
use rating_core::error::DomainError;
use rating_core::ledger::{self, ActionWrite, LedgerOp, LedgerReceipt, LedgerRequest, Plan, PriorLookup};
use rating_core::traits::{LedgerStore, RepoResult};
use rating_core::value_objects::Snowflake;

use crate::mappers::ActionInsert;
use crate::models::ActionModel;

use super::error::{action_not_found, map_db_error, map_unique_violation, project_not_found};

/// PostgreSQL implementation of LedgerStore
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    /// Create a new PgLedgerStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    #[instrument(skip(self, request), fields(history_id = %request.history_id))]
    async fn commit(&self, request: &LedgerRequest) -> RepoResult<LedgerReceipt> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let project_id = match &request.op {
            LedgerOp::Contribute { project_id, .. } => *project_id,
            LedgerOp::Reverse { action_id, .. } => target_project(&mut *tx, *action_id).await?,
        };

        let score_before = lock_score(&mut *tx, project_id).await?;
        let prior = find_prior(&mut *tx, request.op.prior_lookup()).await?;
        let plan = ledger::plan(request, prior.as_ref())?;

        write_action(&mut *tx, &plan).await?;

        let score_after = sqlx::query_scalar::<_, i64>(
            r"
            UPDATE projects
            SET score = score + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING score
            ",
        )
        .bind(project_id.into_inner())
        .bind(plan.delta)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let record = plan.history_record(request.history_id, score_before, request.at)?;
        if record.score_after != score_after {
            // Dropping the transaction rolls everything back
            return Err(DomainError::InternalError(format!(
                "score of project {project_id} moved while locked: expected {}, found {score_after}",
                record.score_after
            )));
        }

        sqlx::query(
            r"
            INSERT INTO rating_history
                (id, project_id, actor_id, admin_id, kind, score_before, score_after, delta,
                 reason, is_admin_action, related_action_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(record.id.into_inner())
        .bind(record.project_id.into_inner())
        .bind(record.actor_id.map(i64::from))
        .bind(record.admin_id.map(i64::from))
        .bind(record.kind.as_str())
        .bind(record.score_before)
        .bind(record.score_after)
        .bind(record.delta)
        .bind(&record.reason)
        .bind(record.is_admin_action)
        .bind(record.related_action_id.map(Snowflake::into_inner))
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        debug!(
            project_id = %project_id,
            delta = plan.delta,
            score_before,
            score_after,
            kind = %plan.kind,
            "Ledger mutation committed"
        );

        Ok(plan.receipt(&record))
    }

    #[instrument(skip(self))]
    async fn derived_score(&self, project_id: Snowflake) -> RepoResult<i64> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(project_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        if !exists {
            return Err(project_not_found(project_id));
        }

        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(delta), 0)::BIGINT FROM rating_actions WHERE project_id = $1",
        )
        .bind(project_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}

async fn target_project(conn: &mut PgConnection, action_id: Snowflake) -> RepoResult<Snowflake> {
    sqlx::query_scalar::<_, i64>("SELECT project_id FROM rating_actions WHERE id = $1")
        .bind(action_id.into_inner())
        .fetch_optional(conn)
        .await
        .map_err(map_db_error)?
        .map(Snowflake::new)
        .ok_or_else(|| action_not_found(action_id))
}

/// Row-lock the project and return its current score
async fn lock_score(conn: &mut PgConnection, project_id: Snowflake) -> RepoResult<i64> {
    sqlx::query_scalar::<_, i64>(
        r"
        SELECT score FROM projects
        WHERE id = $1 AND deleted_at IS NULL
        FOR UPDATE
        ",
    )
    .bind(project_id.into_inner())
    .fetch_optional(conn)
    .await
    .map_err(map_db_error)?
    .ok_or_else(|| project_not_found(project_id))
}

async fn find_prior(conn: &mut PgConnection, lookup: PriorLookup) -> RepoResult<Option<Action>> {
    let row = match lookup {
        PriorLookup::None => return Ok(None),
        PriorLookup::ByKey {
            actor_id,
            project_id,
            kind,
        } => {
            sqlx::query_as::<_, ActionModel>(
                r"
                SELECT id, actor_id, project_id, kind, text, stars, delta, reason, created_at, updated_at
                FROM rating_actions
                WHERE actor_id = $1 AND project_id = $2 AND kind = $3
                FOR UPDATE
                ",
            )
            .bind(actor_id.into_inner())
            .bind(project_id.into_inner())
            .bind(kind.as_str())
            .fetch_optional(conn)
            .await
        }
        PriorLookup::ByAction(action_id) => {
            sqlx::query_as::<_, ActionModel>(
                r"
                SELECT id, actor_id, project_id, kind, text, stars, delta, reason, created_at, updated_at
                FROM rating_actions
                WHERE id = $1
                FOR UPDATE
                ",
            )
            .bind(action_id.into_inner())
            .fetch_optional(conn)
            .await
        }
    }
    .map_err(map_db_error)?;

    row.map(Action::try_from).transpose()
}

async fn write_action(conn: &mut PgConnection, plan: &Plan) -> RepoResult<()> {
    match &plan.write {
        ActionWrite::Insert(action) => {
            let row = ActionInsert::new(action);
            sqlx::query(
                r"
                INSERT INTO rating_actions
                    (id, actor_id, project_id, kind, text, stars, delta, reason, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
                ",
            )
            .bind(row.id)
            .bind(row.actor_id)
            .bind(row.project_id)
            .bind(row.kind)
            .bind(row.text)
            .bind(row.stars)
            .bind(row.delta)
            .bind(row.reason)
            .bind(action.created_at)
            .execute(conn)
            .await
            .map_err(|e| {
                // A like raced by the same actor is a real duplicate; a review
                // race is retried and then planned as an edit
                map_unique_violation(e, || match action.kind {
                    ActionKind::Like => DomainError::DuplicateContribution(ActionKind::Like),
                    _ => DomainError::WriteConflict,
                })
            })?;
        }
        ActionWrite::Update {
            id,
            text,
            stars,
            delta,
            at,
        } => {
            sqlx::query(
                r"
                UPDATE rating_actions
                SET text = $2, stars = $3, delta = $4, updated_at = $5
                WHERE id = $1
                ",
            )
            .bind(id.into_inner())
            .bind(text.as_str())
            .bind(i16::from(stars.get()))
            .bind(*delta)
            .bind(*at)
            .execute(conn)
            .await
            .map_err(map_db_error)?;
        }
        ActionWrite::Delete { id } => {
            let result = sqlx::query("DELETE FROM rating_actions WHERE id = $1")
                .bind(id.into_inner())
                .execute(conn)
                .await
                .map_err(map_db_error)?;

            if result.rows_affected() == 0 {
                return Err(action_not_found(*id));
            }
        }
    }

    Ok(())
}
