//! Outbound DTOs
//!
//! Replies are typed data; rendering them for a transport happens elsewhere.

use chrono::{DateTime, Utc};
use rating_common::ErrorResponse;
use rating_core::entities::{ActionKind, HistoryKind};
use rating_core::{ActorId, CategoryCount, LedgerReceipt, Snowflake};
use serde::Serialize;

// ============================================================================
// Dispatcher replies
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    /// Nothing is sent back (banned actor)
    Silent,
    Greeting,
    Liked { receipt: LedgerReceipt },
    ReviewStarted { project: ProjectResponse },
    AwaitingStars { project_id: Snowflake },
    ReviewCommitted { receipt: LedgerReceipt },
    Cancelled { had_review: bool },
    Throttled { retry_after_secs: u64 },
    Admin { reply: AdminReply },
    Error { error: ErrorResponse },
}

impl Reply {
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Silent)
    }

    /// Error code when the reply reports a failure
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Error { error } => Some(error.code.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AdminReply {
    ProjectAdded { project: ProjectResponse },
    ProjectRemoved { project_id: Snowflake },
    ScoreAdjusted { receipt: LedgerReceipt },
    ContributionRemoved { receipt: LedgerReceipt },
    Banned { actor_id: ActorId },
    Unbanned { actor_id: ActorId, was_banned: bool },
    Stats { stats: AdminStatsResponse },
}

// ============================================================================
// Catalog responses
// ============================================================================

/// Project as shown to readers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectResponse {
    pub id: Snowflake,
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub score: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResponse {
    pub id: Snowflake,
    pub actor_id: ActorId,
    pub project_id: Snowflake,
    pub kind: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars: Option<u8>,
    pub delta: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryResponse {
    pub id: Snowflake,
    pub project_id: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<ActorId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<ActorId>,
    pub kind: HistoryKind,
    pub score_before: i64,
    pub score_after: i64,
    pub delta: i64,
    pub reason: String,
    pub is_admin_action: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_action_id: Option<Snowflake>,
    pub created_at: DateTime<Utc>,
}

/// Offset-paginated listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

impl<T> PageResponse<T> {
    pub fn new(items: Vec<T>, total: i64, limit: i64, offset: i64) -> Self {
        let has_more = offset + (items.len() as i64) < total;
        Self {
            items,
            total,
            limit,
            offset,
            has_more,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDetailResponse {
    pub project: ProjectResponse,
    pub reviews: Vec<ActionResponse>,
    pub likes: i64,
    pub history: Vec<HistoryResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsResponse {
    pub total_projects: i64,
    pub total_reviews: i64,
    pub total_likes: i64,
    pub top_projects: Vec<ProjectResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminStatsResponse {
    #[serde(flatten)]
    pub catalog: StatsResponse,
    pub banned_actors: usize,
    pub archived_history: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorProfileResponse {
    pub actor_id: ActorId,
    pub reviews: Vec<ActionResponse>,
    pub liked_project_ids: Vec<Snowflake>,
}

pub type CategoryResponse = CategoryCount;
