//! Rating history database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for rating_history table
#[derive(Debug, Clone, FromRow)]
pub struct HistoryModel {
    pub id: i64,
    pub project_id: i64,
    pub actor_id: Option<i64>,
    pub admin_id: Option<i64>,
    pub kind: String,
    pub score_before: i64,
    pub score_after: i64,
    pub delta: i64,
    pub reason: String,
    pub is_admin_action: bool,
    pub related_action_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
