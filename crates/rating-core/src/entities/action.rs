//! Action entity - one live contribution to a project's score

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;
use crate::value_objects::{ActorId, Snowflake, Stars};

/// Kind of contribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Like,
    Review,
    AdminAdjustment,
}

impl ActionKind {
    /// Storage representation
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Review => "review",
            Self::AdminAdjustment => "admin_adjustment",
        }
    }

    /// Likes and reviews are limited to one per actor and project
    pub const fn is_unique_per_actor(self) -> bool {
        matches!(self, Self::Like | Self::Review)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdminAdjustment => f.write_str("adjustment"),
            other => f.write_str(other.as_str()),
        }
    }
}

impl std::str::FromStr for ActionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "review" => Ok(Self::Review),
            "admin_adjustment" => Ok(Self::AdminAdjustment),
            other => Err(DomainError::InternalError(format!(
                "unknown action kind: {other}"
            ))),
        }
    }
}

/// What an actor is contributing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionPayload {
    Like,
    Review { text: String, stars: Stars },
    AdminAdjustment { delta: i64, reason: String },
}

impl ActionPayload {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Like => ActionKind::Like,
            Self::Review { .. } => ActionKind::Review,
            Self::AdminAdjustment { .. } => ActionKind::AdminAdjustment,
        }
    }
}

/// A live contribution
///
/// `delta` is the amount this action currently contributes to the project's
/// score, so removing it means applying `-delta`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: Snowflake,
    pub actor_id: ActorId,
    pub project_id: Snowflake,
    pub kind: ActionKind,
    pub text: Option<String>,
    pub stars: Option<Stars>,
    pub delta: i64,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Action {
    /// Build a fresh action row from a payload
    pub fn from_payload(
        id: Snowflake,
        actor_id: ActorId,
        project_id: Snowflake,
        payload: &ActionPayload,
        at: DateTime<Utc>,
    ) -> Self {
        let (text, stars, delta, reason) = match payload {
            ActionPayload::Like => (None, None, 1, None),
            ActionPayload::Review { text, stars } => {
                (Some(text.clone()), Some(*stars), stars.weight(), None)
            }
            ActionPayload::AdminAdjustment { delta, reason } => {
                (None, None, *delta, Some(reason.clone()))
            }
        };

        Self {
            id,
            actor_id,
            project_id,
            kind: payload.kind(),
            text,
            stars,
            delta,
            reason,
            created_at: at,
            updated_at: at,
        }
    }
}
