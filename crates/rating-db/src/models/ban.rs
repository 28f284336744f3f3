//! Ban database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for banned_actors table
#[derive(Debug, Clone, FromRow)]
pub struct BanModel {
    pub actor_id: i64,
    pub reason: Option<String>,
    pub banned_by: i64,
    pub created_at: DateTime<Utc>,
}
