//! Ledger requests and receipts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{ActionKind, ActionPayload, HistoryKind};
use crate::value_objects::{ActorId, Snowflake};

/// One mutation submitted to a [`LedgerStore`](crate::traits::LedgerStore)
///
/// Ids are allocated by the caller so a retried request reuses them.
#[derive(Debug, Clone)]
pub struct LedgerRequest {
    /// Id of the action row if the mutation inserts one
    pub action_id: Snowflake,
    pub history_id: Snowflake,
    pub at: DateTime<Utc>,
    pub op: LedgerOp,
}

#[derive(Debug, Clone)]
pub enum LedgerOp {
    /// Like, review (new or edit) or admin adjustment
    Contribute {
        actor_id: ActorId,
        project_id: Snowflake,
        payload: ActionPayload,
    },
    /// Remove a live action and compensate its contribution
    Reverse {
        admin_id: ActorId,
        action_id: Snowflake,
        reason: Option<String>,
    },
}

/// How a store finds the prior action a request depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorLookup {
    /// Existing like/review by the same actor on the same project
    ByKey {
        actor_id: ActorId,
        project_id: Snowflake,
        kind: ActionKind,
    },
    /// Reversal target
    ByAction(Snowflake),
    /// Adjustments never depend on earlier rows
    None,
}

impl LedgerOp {
    /// Project known up front; reversals learn it from the target action
    pub fn project_id(&self) -> Option<Snowflake> {
        match self {
            Self::Contribute { project_id, .. } => Some(*project_id),
            Self::Reverse { .. } => None,
        }
    }

    pub fn prior_lookup(&self) -> PriorLookup {
        match self {
            Self::Contribute {
                actor_id,
                project_id,
                payload,
            } => {
                let kind = payload.kind();
                if kind.is_unique_per_actor() {
                    PriorLookup::ByKey {
                        actor_id: *actor_id,
                        project_id: *project_id,
                        kind,
                    }
                } else {
                    PriorLookup::None
                }
            }
            Self::Reverse { action_id, .. } => PriorLookup::ByAction(*action_id),
        }
    }
}

/// Result of a committed ledger mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    pub project_id: Snowflake,
    /// Action that was inserted, updated or removed
    pub contribution_id: Snowflake,
    pub history_id: Snowflake,
    pub outcome: HistoryKind,
    pub delta: i64,
    pub score_before: i64,
    pub new_score: i64,
    pub actor_id: Option<ActorId>,
    pub admin_id: Option<ActorId>,
    pub reason: String,
}
