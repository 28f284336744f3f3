//! Ban entity <-> model mapper

use rating_core::entities::Ban;
use rating_core::value_objects::ActorId;

use crate::models::BanModel;

impl From<BanModel> for Ban {
    fn from(model: BanModel) -> Self {
        Ban {
            actor_id: ActorId::new(model.actor_id),
            reason: model.reason,
            banned_by: ActorId::new(model.banned_by),
            created_at: model.created_at,
        }
    }
}
