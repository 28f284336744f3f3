//! Pub/Sub channel definitions.

use rating_core::{LedgerEvent, Snowflake};

/// Channel every ledger event is published to
pub const AUDIT_CHANNEL: &str = "ledger:audit";
/// Channel prefix for events concerning one project
pub const PROJECT_CHANNEL_PREFIX: &str = "ledger:entity:";

/// Pub/Sub channel types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LedgerChannel {
    /// Full audit stream
    Audit,
    /// Events for a specific project
    Project(Snowflake),
}

impl LedgerChannel {
    #[must_use]
    pub fn project(project_id: Snowflake) -> Self {
        Self::Project(project_id)
    }

    /// Get the Redis channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Audit => AUDIT_CHANNEL.to_string(),
            Self::Project(id) => format!("{PROJECT_CHANNEL_PREFIX}{id}"),
        }
    }

    /// Parse a channel name back to a `LedgerChannel`
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if name == AUDIT_CHANNEL {
            return Some(Self::Audit);
        }
        name.strip_prefix(PROJECT_CHANNEL_PREFIX)
            .and_then(|id| id.parse::<i64>().ok())
            .map(|id| Self::Project(Snowflake::new(id)))
    }

    /// Channels an event fans out to: always the audit stream, plus the
    /// project's own channel when it concerns one
    #[must_use]
    pub fn targets(event: &LedgerEvent) -> Vec<Self> {
        let mut channels = vec![Self::Audit];
        if let Some(project_id) = event.project_id() {
            channels.push(Self::Project(project_id));
        }
        channels
    }
}

impl std::fmt::Display for LedgerChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
