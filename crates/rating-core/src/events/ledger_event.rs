//! Ledger events - emitted after a score change or ban list change is committed
//!
//! Consumed by the pub/sub publisher for audit fan-out. Emission is best effort
//! and never part of the ledger transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::HistoryKind;
use crate::ledger::LedgerReceipt;
use crate::value_objects::{ActorId, Snowflake};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEvent {
    ScoreChanged(ScoreChangedEvent),
    ProjectAdded(ProjectAddedEvent),
    ProjectRemoved(ProjectRemovedEvent),
    ActorBanned(ActorBannedEvent),
    ActorUnbanned(ActorUnbannedEvent),
}

impl LedgerEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ScoreChanged(_) => "SCORE_CHANGED",
            Self::ProjectAdded(_) => "PROJECT_ADDED",
            Self::ProjectRemoved(_) => "PROJECT_REMOVED",
            Self::ActorBanned(_) => "ACTOR_BANNED",
            Self::ActorUnbanned(_) => "ACTOR_UNBANNED",
        }
    }

    /// Project the event concerns, if any
    pub fn project_id(&self) -> Option<Snowflake> {
        match self {
            Self::ScoreChanged(e) => Some(e.project_id),
            Self::ProjectAdded(e) => Some(e.project_id),
            Self::ProjectRemoved(e) => Some(e.project_id),
            Self::ActorBanned(_) | Self::ActorUnbanned(_) => None,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::ScoreChanged(e) => e.timestamp,
            Self::ProjectAdded(e) => e.timestamp,
            Self::ProjectRemoved(e) => e.timestamp,
            Self::ActorBanned(e) => e.timestamp,
            Self::ActorUnbanned(e) => e.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreChangedEvent {
    pub project_id: Snowflake,
    pub history_id: Snowflake,
    pub action_id: Snowflake,
    pub kind: HistoryKind,
    pub delta: i64,
    pub score_before: i64,
    pub score_after: i64,
    pub actor_id: Option<ActorId>,
    pub admin_id: Option<ActorId>,
    pub timestamp: DateTime<Utc>,
}

impl From<&LedgerReceipt> for ScoreChangedEvent {
    fn from(receipt: &LedgerReceipt) -> Self {
        Self {
            project_id: receipt.project_id,
            history_id: receipt.history_id,
            action_id: receipt.contribution_id,
            kind: receipt.outcome,
            delta: receipt.delta,
            score_before: receipt.score_before,
            score_after: receipt.new_score,
            actor_id: receipt.actor_id,
            admin_id: receipt.admin_id,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectAddedEvent {
    pub project_id: Snowflake,
    pub name: String,
    pub category: String,
    pub admin_id: ActorId,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRemovedEvent {
    pub project_id: Snowflake,
    pub admin_id: ActorId,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorBannedEvent {
    pub actor_id: ActorId,
    pub admin_id: ActorId,
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorUnbannedEvent {
    pub actor_id: ActorId,
    pub admin_id: ActorId,
    pub timestamp: DateTime<Utc>,
}
