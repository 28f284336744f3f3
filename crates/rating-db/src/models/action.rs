//! Rating action database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for rating_actions table
#[derive(Debug, Clone, FromRow)]
pub struct ActionModel {
    pub id: i64,
    pub actor_id: i64,
    pub project_id: i64,
    pub kind: String,
    pub text: Option<String>,
    pub stars: Option<i16>,
    pub delta: i64,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
