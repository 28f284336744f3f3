//! Ledger service
//!
//! Front door of the rating ledger: allocates ids, retries write conflicts,
//! and fans committed mutations out as events.

use std::time::Duration;

use chrono::Utc;
use rating_core::entities::ActionPayload;
use rating_core::events::ScoreChangedEvent;
use rating_core::{ActorId, DomainError, LedgerEvent, LedgerOp, LedgerReceipt, LedgerRequest, Snowflake};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Pause between conflicting attempts, multiplied by the attempt number
const RETRY_BACKOFF: Duration = Duration::from_millis(5);

/// Stored aggregate against the sum of live contributions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub project_id: Snowflake,
    pub stored: i64,
    pub derived: i64,
    pub drift: i64,
}

impl ReconcileReport {
    pub fn is_consistent(&self) -> bool {
        self.drift == 0
    }
}

/// Ledger service
pub struct LedgerService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LedgerService<'a> {
    /// Create a new LedgerService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record a like, a review (new or edited) or an admin adjustment
    #[instrument(skip(self, payload), fields(kind = %payload.kind()))]
    pub async fn apply_action(
        &self,
        actor_id: ActorId,
        project_id: Snowflake,
        payload: ActionPayload,
    ) -> ServiceResult<LedgerReceipt> {
        let request = self.request(LedgerOp::Contribute {
            actor_id,
            project_id,
            payload,
        });
        self.commit(request).await
    }

    /// Remove a live action and compensate its contribution
    #[instrument(skip(self))]
    pub async fn reverse_action(
        &self,
        admin_id: ActorId,
        action_id: Snowflake,
        reason: Option<String>,
    ) -> ServiceResult<LedgerReceipt> {
        let request = self.request(LedgerOp::Reverse {
            admin_id,
            action_id,
            reason,
        });
        self.commit(request).await
    }

    /// Compare a project's stored score with the sum of its live actions
    #[instrument(skip(self))]
    pub async fn reconcile(&self, project_id: Snowflake) -> ServiceResult<ReconcileReport> {
        let project = self
            .ctx
            .project_repo()
            .find_by_id(project_id)
            .await?
            .ok_or(DomainError::ProjectNotFound(project_id))?;
        let derived = self.ctx.ledger().derived_score(project_id).await?;

        let report = ReconcileReport {
            project_id,
            stored: project.score,
            derived,
            drift: project.score - derived,
        };
        if !report.is_consistent() {
            warn!(
                project_id = %project_id,
                stored = report.stored,
                derived = report.derived,
                "Score drift detected"
            );
        }
        Ok(report)
    }

    fn request(&self, op: LedgerOp) -> LedgerRequest {
        LedgerRequest {
            action_id: self.ctx.generate_id(),
            history_id: self.ctx.generate_id(),
            at: Utc::now(),
            op,
        }
    }

    /// Commit with bounded retries on write conflicts, reusing the same ids
    async fn commit(&self, request: LedgerRequest) -> ServiceResult<LedgerReceipt> {
        let max_attempts = self.ctx.ledger_max_attempts();
        let mut attempt = 1;

        let receipt = loop {
            match self.ctx.ledger().commit(&request).await {
                Ok(receipt) => break receipt,
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    warn!(attempt, max_attempts, "Ledger write conflict, retrying");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                    attempt += 1;
                }
                Err(e) if e.is_retryable() => {
                    warn!(attempts = attempt, "Ledger write conflict persisted");
                    return Err(ServiceError::TransientFailure);
                }
                Err(e) => {
                    if !(e.is_not_found() || e.is_validation() || e.is_conflict()) {
                        error!(error = %e, "Ledger commit failed");
                    }
                    return Err(e.into());
                }
            }
        };

        info!(
            project_id = %receipt.project_id,
            outcome = %receipt.outcome,
            delta = receipt.delta,
            new_score = receipt.new_score,
            "Score changed"
        );

        let event = LedgerEvent::ScoreChanged(ScoreChangedEvent::from(&receipt));
        publish_best_effort(self.ctx, &event).await;

        Ok(receipt)
    }
}

/// Publish an event; failures are logged and never reach the caller
pub(crate) async fn publish_best_effort(ctx: &ServiceContext, event: &LedgerEvent) {
    if let Err(e) = ctx.event_sink().publish(event).await {
        warn!(event_type = event.event_type(), error = %e, "Failed to publish ledger event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{context_with_ledger, memory_context, seed_project};
    use async_trait::async_trait;
    use rating_core::entities::{ActionKind, HistoryKind};
    use rating_core::traits::{LedgerStore, RepoResult};
    use rating_core::Stars;
    use rating_db::MemoryStore;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn review(stars: u8) -> ActionPayload {
        ActionPayload::Review {
            text: "review".into(),
            stars: Stars::new(stars).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_like_then_duplicate() {
        let (ctx, _store, sink) = memory_context();
        let project = seed_project(&ctx, "tokio").await;
        let ledger = LedgerService::new(&ctx);
        let actor = ActorId::new(1);

        let receipt = ledger.apply_action(actor, project.id, ActionPayload::Like).await.unwrap();
        assert_eq!(receipt.new_score, 1);
        assert_eq!(receipt.outcome, HistoryKind::AddLike);

        let err = ledger
            .apply_action(actor, project.id, ActionPayload::Like)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::DuplicateContribution(ActionKind::Like))
        ));
        assert_eq!(sink.events().len(), 1);
    }

    #[tokio::test]
    async fn test_final_score_sums_latest_reviews_and_likes() {
        let (ctx, _store, _sink) = memory_context();
        let project = seed_project(&ctx, "serde").await;
        let ledger = LedgerService::new(&ctx);

        // actor 1: 2 stars then 5 stars, actor 2: 1 star and a like, actor 3: like
        ledger.apply_action(ActorId::new(1), project.id, review(2)).await.unwrap();
        let edit = ledger.apply_action(ActorId::new(1), project.id, review(5)).await.unwrap();
        assert_eq!(edit.delta, 7);
        ledger.apply_action(ActorId::new(2), project.id, review(1)).await.unwrap();
        ledger.apply_action(ActorId::new(2), project.id, ActionPayload::Like).await.unwrap();
        let last = ledger
            .apply_action(ActorId::new(3), project.id, ActionPayload::Like)
            .await
            .unwrap();

        assert_eq!(last.new_score, 5 - 5 + 2);
        assert!(ledger.reconcile(project.id).await.unwrap().is_consistent());
    }

    #[tokio::test]
    async fn test_identical_re_review_has_zero_delta() {
        let (ctx, _store, _sink) = memory_context();
        let project = seed_project(&ctx, "axum").await;
        let ledger = LedgerService::new(&ctx);

        ledger.apply_action(ActorId::new(1), project.id, review(4)).await.unwrap();
        let again = ledger.apply_action(ActorId::new(1), project.id, review(4)).await.unwrap();
        assert_eq!(again.delta, 0);
        assert_eq!(again.new_score, 2);
        assert_eq!(again.outcome, HistoryKind::UpdateReview);
    }

    #[tokio::test]
    async fn test_reversal_of_one_star_review() {
        let (ctx, _store, _sink) = memory_context();
        let project = seed_project(&ctx, "rayon").await;
        let ledger = LedgerService::new(&ctx);

        let one_star = ledger.apply_action(ActorId::new(1), project.id, review(1)).await.unwrap();
        let history_before = ctx.history_repo().find_by_project(project.id, 100).await.unwrap();

        let reversal = ledger
            .reverse_action(ActorId::new(99), one_star.contribution_id, None)
            .await
            .unwrap();
        assert_eq!(reversal.delta, 5);
        assert_eq!(reversal.new_score, 0);
        assert_eq!(reversal.reason, "Review removed by administrator");

        let history_after = ctx.history_repo().find_by_project(project.id, 100).await.unwrap();
        assert_eq!(history_after.len(), history_before.len() + 1);
        assert_eq!(history_after[0].delta, 5);
        assert_eq!(history_after[0].related_action_id, Some(one_star.contribution_id));
    }

    #[tokio::test]
    async fn test_adjustment_validation() {
        let (ctx, _store, _sink) = memory_context();
        let project = seed_project(&ctx, "clap").await;
        let ledger = LedgerService::new(&ctx);

        let err = ledger
            .apply_action(
                ActorId::new(9),
                project.id,
                ActionPayload::AdminAdjustment {
                    delta: 0,
                    reason: "noop".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::ZeroAdjustment)));

        let err = ledger
            .apply_action(
                ActorId::new(9),
                project.id,
                ActionPayload::AdminAdjustment {
                    delta: 10,
                    reason: "  ".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::EmptyReason)));
    }

    #[tokio::test]
    async fn test_concurrent_first_reviews_reach_ten() {
        let (ctx, _store, _sink) = memory_context();
        let project = seed_project(&ctx, "hyper").await;

        let a = {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                LedgerService::new(&ctx)
                    .apply_action(ActorId::new(1), project.id, review(5))
                    .await
            })
        };
        let b = {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                LedgerService::new(&ctx)
                    .apply_action(ActorId::new(2), project.id, review(5))
                    .await
            })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let report = LedgerService::new(&ctx).reconcile(project.id).await.unwrap();
        assert_eq!(report.stored, 10);
        assert!(report.is_consistent());
    }

    /// Fails with a write conflict a fixed number of times, then delegates
    struct Flaky {
        inner: MemoryStore,
        conflicts_left: AtomicU32,
    }

    #[async_trait]
    impl LedgerStore for Flaky {
        async fn commit(&self, request: &LedgerRequest) -> RepoResult<LedgerReceipt> {
            let left = self.conflicts_left.load(Ordering::SeqCst);
            if left > 0 {
                self.conflicts_left.store(left - 1, Ordering::SeqCst);
                return Err(DomainError::WriteConflict);
            }
            self.inner.commit(request).await
        }

        async fn derived_score(&self, project_id: Snowflake) -> RepoResult<i64> {
            self.inner.derived_score(project_id).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_conflicts_are_retried() {
        let flaky = Arc::new(Flaky {
            inner: MemoryStore::new(),
            conflicts_left: AtomicU32::new(2),
        });
        let ctx = context_with_ledger(flaky.clone(), 3);

        // Project lives in the wrapped store
        let project = rating_core::Project::new(ctx.generate_id(), "nom".into(), "parsing".into());
        rating_core::traits::ProjectRepository::create(&flaky.inner, &project)
            .await
            .unwrap();

        let receipt = LedgerService::new(&ctx)
            .apply_action(ActorId::new(1), project.id, ActionPayload::Like)
            .await
            .unwrap();
        assert_eq!(receipt.new_score, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_conflict_becomes_transient_failure() {
        let flaky = Arc::new(Flaky {
            inner: MemoryStore::new(),
            conflicts_left: AtomicU32::new(10),
        });
        let ctx = context_with_ledger(flaky.clone(), 3);

        let err = LedgerService::new(&ctx)
            .apply_action(ActorId::new(1), Snowflake::new(1), ActionPayload::Like)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::TransientFailure));
        assert_eq!(flaky.conflicts_left.load(Ordering::SeqCst), 7);
    }

    #[tokio::test]
    async fn test_reconcile_missing_project() {
        let (ctx, _store, _sink) = memory_context();
        let err = LedgerService::new(&ctx)
            .reconcile(Snowflake::new(404))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::ProjectNotFound(_))));
    }
}
