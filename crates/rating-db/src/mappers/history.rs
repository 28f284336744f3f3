//! History record <-> model mapper

use rating_core::entities::{HistoryKind, HistoryRecord};
use rating_core::error::DomainError;
use rating_core::value_objects::{ActorId, Snowflake};

use crate::models::HistoryModel;

impl TryFrom<HistoryModel> for HistoryRecord {
    type Error = DomainError;

    fn try_from(model: HistoryModel) -> Result<Self, Self::Error> {
        let kind: HistoryKind = model.kind.parse()?;
        Ok(HistoryRecord {
            id: Snowflake::new(model.id),
            project_id: Snowflake::new(model.project_id),
            actor_id: model.actor_id.map(ActorId::new),
            admin_id: model.admin_id.map(ActorId::new),
            kind,
            score_before: model.score_before,
            score_after: model.score_after,
            delta: model.delta,
            reason: model.reason,
            is_admin_action: model.is_admin_action,
            related_action_id: model.related_action_id.map(Snowflake::new),
            created_at: model.created_at,
        })
    }
}
