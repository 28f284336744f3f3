//! Ban entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::ActorId;

/// An actor barred from all non-administrative interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ban {
    pub actor_id: ActorId,
    pub reason: Option<String>,
    pub banned_by: ActorId,
    pub created_at: DateTime<Utc>,
}

impl Ban {
    pub fn new(actor_id: ActorId, banned_by: ActorId, reason: Option<String>) -> Self {
        Self {
            actor_id,
            reason: reason.filter(|r| !r.trim().is_empty()),
            banned_by,
            created_at: Utc::now(),
        }
    }
}
