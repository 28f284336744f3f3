//! History retention
//!
//! Moves rating history older than the configured window into the archive.
//! Scores are untouched; only the audit trail is trimmed.

use chrono::{DateTime, Duration, Utc};
use rating_common::RetentionConfig;
use tracing::{debug, info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// How long history stays in the live table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetentionPolicy {
    #[default]
    KeepForever,
    ArchiveAfter(u32),
}

impl RetentionPolicy {
    /// Records created before this instant are archived
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::KeepForever => None,
            Self::ArchiveAfter(days) => Some(now - Duration::days(i64::from(days))),
        }
    }
}

impl From<&RetentionConfig> for RetentionPolicy {
    fn from(config: &RetentionConfig) -> Self {
        match config.archive_after_days {
            Some(days) if days > 0 => Self::ArchiveAfter(days),
            _ => Self::KeepForever,
        }
    }
}

pub struct RetentionService<'a> {
    ctx: &'a ServiceContext,
    policy: RetentionPolicy,
}

impl<'a> RetentionService<'a> {
    pub fn new(ctx: &'a ServiceContext, policy: RetentionPolicy) -> Self {
        Self { ctx, policy }
    }

    /// Archive everything past the window; returns how many records moved
    #[instrument(skip(self), fields(policy = ?self.policy))]
    pub async fn run_once(&self) -> ServiceResult<u64> {
        let Some(cutoff) = self.policy.cutoff(Utc::now()) else {
            debug!("Retention disabled, nothing to archive");
            return Ok(0);
        };

        let moved = self.ctx.history_repo().archive_before(cutoff).await?;
        if moved > 0 {
            info!(moved, %cutoff, "Retention sweep archived history");
        }
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{memory_context, seed_project};
    use rating_core::ledger::{LedgerOp, LedgerRequest};
    use rating_core::{ActionPayload, ActorId};

    fn config(days: Option<u32>) -> RetentionConfig {
        RetentionConfig {
            archive_after_days: days,
            sweep_interval_secs: 3_600,
        }
    }

    #[test]
    fn test_policy_from_config() {
        assert_eq!(RetentionPolicy::from(&config(None)), RetentionPolicy::KeepForever);
        assert_eq!(RetentionPolicy::from(&config(Some(0))), RetentionPolicy::KeepForever);
        assert_eq!(
            RetentionPolicy::from(&config(Some(30))),
            RetentionPolicy::ArchiveAfter(30)
        );
        assert!(RetentionPolicy::KeepForever.cutoff(Utc::now()).is_none());
    }

    #[tokio::test]
    async fn test_run_once_archives_old_history() {
        let (ctx, _store, _sink) = memory_context();
        let project = seed_project(&ctx, "zoxide").await;

        for (actor, age_days) in [(10, 90), (11, 1)] {
            ctx.ledger()
                .commit(&LedgerRequest {
                    action_id: ctx.generate_id(),
                    history_id: ctx.generate_id(),
                    at: Utc::now() - Duration::days(age_days),
                    op: LedgerOp::Contribute {
                        actor_id: ActorId::new(actor),
                        project_id: project.id,
                        payload: ActionPayload::Like,
                    },
                })
                .await
                .unwrap();
        }

        let keep = RetentionService::new(&ctx, RetentionPolicy::KeepForever);
        assert_eq!(keep.run_once().await.unwrap(), 0);

        let service = RetentionService::new(&ctx, RetentionPolicy::ArchiveAfter(30));
        assert_eq!(service.run_once().await.unwrap(), 1);
        assert_eq!(service.run_once().await.unwrap(), 0);

        assert_eq!(ctx.history_repo().count_archived().await.unwrap(), 1);
        let live = ctx.history_repo().find_by_project(project.id, 10).await.unwrap();
        assert_eq!(live.len(), 1);
        let score = ctx.project_repo().find_by_id(project.id).await.unwrap().unwrap().score;
        assert_eq!(score, 2);
    }
}
