//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs; `rating-db` and `rating-cache`
//! provide PostgreSQL, Redis and in-memory implementations.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Action, ActionKind, Ban, HistoryRecord, Project};
use crate::error::DomainError;
use crate::events::LedgerEvent;
use crate::ledger::{LedgerReceipt, LedgerRequest};
use crate::value_objects::{ActorId, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Project Repository
// ============================================================================

/// Ordering for project listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectSort {
    /// Highest score first
    #[default]
    Score,
    /// Alphabetical
    Name,
    /// Newest first
    CreatedAt,
}

impl std::str::FromStr for ProjectSort {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "score" => Ok(Self::Score),
            "name" => Ok(Self::Name),
            "created_at" => Ok(Self::CreatedAt),
            other => Err(DomainError::ValidationError(format!(
                "unknown sort order: {other}"
            ))),
        }
    }
}

/// Query parameters for listing projects
#[derive(Debug, Clone, Default)]
pub struct ProjectQuery {
    pub category: Option<String>,
    pub sort: ProjectSort,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// Projects are read and created here; their score is only ever written by
/// [`LedgerStore::commit`].
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Find a live project by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Project>>;

    /// Find a live project by name (case-insensitive)
    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Project>>;

    /// Create a new project
    async fn create(&self, project: &Project) -> RepoResult<()>;

    /// Soft delete a project
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    /// List live projects
    async fn list(&self, query: &ProjectQuery) -> RepoResult<Vec<Project>>;

    /// Count live projects, optionally within one category
    async fn count(&self, category: Option<&str>) -> RepoResult<i64>;

    /// Case-insensitive substring search over name and description, best score first
    async fn search(&self, query: &str, limit: i64) -> RepoResult<Vec<Project>>;

    /// Live project count per category
    async fn categories(&self) -> RepoResult<Vec<CategoryCount>>;
}

// ============================================================================
// Action Repository
// ============================================================================

/// Read access to live actions; writes go through [`LedgerStore`]
#[async_trait]
pub trait ActionRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Action>>;

    /// The actor's like or review on a project
    async fn find_contribution(
        &self,
        actor_id: ActorId,
        project_id: Snowflake,
        kind: ActionKind,
    ) -> RepoResult<Option<Action>>;

    /// Newest reviews of a project
    async fn reviews_for_project(&self, project_id: Snowflake, limit: i64)
        -> RepoResult<Vec<Action>>;

    /// Count live actions of a kind, globally or for one project
    async fn count_by_kind(&self, project_id: Option<Snowflake>, kind: ActionKind)
        -> RepoResult<i64>;

    /// All live actions of a kind by one actor, newest first
    async fn find_by_actor(&self, actor_id: ActorId, kind: ActionKind) -> RepoResult<Vec<Action>>;
}

// ============================================================================
// History Repository
// ============================================================================

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Newest history records of a project
    async fn find_by_project(&self, project_id: Snowflake, limit: i64)
        -> RepoResult<Vec<HistoryRecord>>;

    /// Move every record created before `cutoff` into the archive, atomically
    async fn archive_before(&self, cutoff: DateTime<Utc>) -> RepoResult<u64>;

    /// Number of archived records
    async fn count_archived(&self) -> RepoResult<i64>;
}

// ============================================================================
// Ledger Store
// ============================================================================

/// The only writer of actions, scores and history
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Lock the project, plan against the prior action, write the action row,
    /// bump the score and append history, all in one transaction
    async fn commit(&self, request: &LedgerRequest) -> RepoResult<LedgerReceipt>;

    /// Sum of live action deltas for a project
    async fn derived_score(&self, project_id: Snowflake) -> RepoResult<i64>;
}

// ============================================================================
// Ban Repository
// ============================================================================

#[async_trait]
pub trait BanRepository: Send + Sync {
    /// Check if an actor is banned
    async fn is_banned(&self, actor_id: ActorId) -> RepoResult<bool>;

    /// Get ban record
    async fn find(&self, actor_id: ActorId) -> RepoResult<Option<Ban>>;

    /// List all bans, newest first
    async fn list(&self) -> RepoResult<Vec<Ban>>;

    /// Create or replace a ban
    async fn create(&self, ban: &Ban) -> RepoResult<()>;

    /// Remove a ban; returns whether one existed
    async fn delete(&self, actor_id: ActorId) -> RepoResult<bool>;
}

// ============================================================================
// Cooldown Limiter
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownStatus {
    /// Attempt accepted; the window restarts now
    Ready,
    /// Attempt rejected; the window is left untouched
    CoolingDown { retry_after: Duration },
}

impl CooldownStatus {
    /// Whole seconds to wait, rounded up and never below one
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::Ready => None,
            Self::CoolingDown { retry_after } => {
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                Some(secs.max(1))
            }
        }
    }
}

/// Per-actor mutation cooldown
#[async_trait]
pub trait CooldownLimiter: Send + Sync {
    async fn try_acquire(&self, actor_id: ActorId) -> RepoResult<CooldownStatus>;
}

// ============================================================================
// Event Sink
// ============================================================================

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: &LedgerEvent) -> RepoResult<()>;
}
