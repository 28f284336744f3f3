//! History records - the immutable audit trail of score changes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::ActionKind;
use crate::error::DomainError;
use crate::value_objects::{ActorId, Snowflake};

/// What kind of change a history record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    AddLike,
    NewReview,
    UpdateReview,
    AdminAdjustment,
    RemoveLike,
    RemoveReview,
    RemoveAdjustment,
}

impl HistoryKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AddLike => "add_like",
            Self::NewReview => "new_review",
            Self::UpdateReview => "update_review",
            Self::AdminAdjustment => "admin_adjustment",
            Self::RemoveLike => "remove_like",
            Self::RemoveReview => "remove_review",
            Self::RemoveAdjustment => "remove_adjustment",
        }
    }

    /// History kind written when an action of `kind` is reversed
    pub const fn removal_of(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Like => Self::RemoveLike,
            ActionKind::Review => Self::RemoveReview,
            ActionKind::AdminAdjustment => Self::RemoveAdjustment,
        }
    }

    pub const fn is_removal(self) -> bool {
        matches!(
            self,
            Self::RemoveLike | Self::RemoveReview | Self::RemoveAdjustment
        )
    }
}

impl std::fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HistoryKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "add_like" => Self::AddLike,
            "new_review" => Self::NewReview,
            "update_review" => Self::UpdateReview,
            "admin_adjustment" => Self::AdminAdjustment,
            "remove_like" => Self::RemoveLike,
            "remove_review" => Self::RemoveReview,
            "remove_adjustment" => Self::RemoveAdjustment,
            other => {
                return Err(DomainError::InternalError(format!(
                    "unknown history kind: {other}"
                )))
            }
        })
    }
}

/// One score change, never mutated once written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: Snowflake,
    pub project_id: Snowflake,
    pub actor_id: Option<ActorId>,
    pub admin_id: Option<ActorId>,
    pub kind: HistoryKind,
    pub score_before: i64,
    pub score_after: i64,
    pub delta: i64,
    pub reason: String,
    pub is_admin_action: bool,
    pub related_action_id: Option<Snowflake>,
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    /// `score_after - score_before` always equals `delta`
    pub fn is_consistent(&self) -> bool {
        self.score_before.checked_add(self.delta) == Some(self.score_after)
    }
}
