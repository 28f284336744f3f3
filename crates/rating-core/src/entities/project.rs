//! Project entity - the rated subject

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// A rated project with its running aggregate score
///
/// `score` is written only by the ledger; everything else treats it as read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Snowflake,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub score: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project with a zero score
    pub fn new(id: Snowflake, name: String, category: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            category,
            description: None,
            score: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.trim().is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_starts_at_zero() {
        let project = Project::new(Snowflake::new(1), "Ferris".into(), "tools".into())
            .with_description(Some("  ".into()));
        assert_eq!(project.score, 0);
        assert!(project.description.is_none());
        assert_eq!(project.created_at, project.updated_at);
    }
}
