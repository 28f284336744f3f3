//! Inbound DTOs
//!
//! Events arrive already parsed by the messaging transport. Request DTOs
//! carrying free-form input implement `Validate`.

use rating_core::{ActorId, ProjectSort, Snowflake};
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Inbound events
// ============================================================================

/// Sender of an inbound event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    #[serde(default)]
    pub is_privileged: bool,
}

impl Actor {
    pub fn user(id: ActorId) -> Self {
        Self {
            id,
            is_privileged: false,
        }
    }

    pub fn admin(id: ActorId) -> Self {
        Self {
            id,
            is_privileged: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InboundEvent {
    pub actor: Actor,
    /// Transport conversation the reply goes back to
    pub conversation_id: i64,
    pub payload: InboundPayload,
}

impl InboundEvent {
    pub fn new(actor: Actor, conversation_id: i64, payload: InboundPayload) -> Self {
        Self {
            actor,
            conversation_id,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundPayload {
    Greeting,
    Admin { command: AdminCommand },
    Cancel,
    Like { project_id: Snowflake },
    StartReview { project_id: Snowflake },
    /// Free text, only meaningful while a review waits for its text
    Text { text: String },
    /// Raw star choice, parsed into `Stars` by the dispatcher
    Stars { value: String },
}

impl InboundPayload {
    /// Commands pre-empt any review in progress; text and stars feed it
    pub fn is_command(&self) -> bool {
        !matches!(self, Self::Text { .. } | Self::Stars { .. })
    }
}

// ============================================================================
// Admin Requests
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AdminCommand {
    AddProject(AddProjectRequest),
    RemoveProject { project_id: Snowflake },
    AdjustScore(AdjustScoreRequest),
    RemoveReview(RemoveReviewRequest),
    Ban(BanRequest),
    Unban { actor_id: ActorId },
    Stats,
}

/// Add project request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct AddProjectRequest {
    #[validate(length(min = 1, max = 100, message = "Project name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 50, message = "Category must be 1-50 characters"))]
    pub category: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

/// Manual score adjustment, addressed by project name
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct AdjustScoreRequest {
    #[validate(length(min = 1, max = 100, message = "Project name must be 1-100 characters"))]
    pub project_name: String,

    pub delta: i64,

    #[validate(length(min = 1, max = 500, message = "Reason must be 1-500 characters"))]
    pub reason: String,
}

/// Reverse a contribution (review, like or adjustment)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct RemoveReviewRequest {
    pub action_id: Snowflake,

    #[validate(length(min = 1, max = 500, message = "Reason must be 1-500 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct BanRequest {
    pub actor_id: ActorId,

    #[validate(length(min = 1, max = 500, message = "Reason must be 1-500 characters"))]
    pub reason: Option<String>,
}

// ============================================================================
// Catalog Queries
// ============================================================================

/// Project listing query
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListProjectsQuery {
    #[validate(length(min = 1, max = 50, message = "Category must be 1-50 characters"))]
    pub category: Option<String>,

    #[serde(default)]
    pub sort: ProjectSort,

    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,

    #[validate(range(min = 0, message = "Offset must not be negative"))]
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchQuery {
    #[validate(length(min = 2, max = 100, message = "Search query must be 2-100 characters"))]
    pub q: String,

    #[validate(range(min = 1, max = 50, message = "Limit must be between 1 and 50"))]
    pub limit: Option<i64>,
}
