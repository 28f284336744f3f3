//! Project database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for projects table
#[derive(Debug, Clone, FromRow)]
pub struct ProjectModel {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub score: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ProjectModel {
    /// Check if project is soft deleted
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// `(category, count)` row
#[derive(Debug, Clone, FromRow)]
pub struct CategoryCountModel {
    pub category: String,
    pub count: i64,
}
