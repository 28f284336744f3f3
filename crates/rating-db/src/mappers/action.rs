//! Action entity <-> model mapper

use rating_core::entities::{Action, ActionKind};
use rating_core::error::DomainError;
use rating_core::value_objects::{ActorId, Snowflake, Stars};

use crate::models::ActionModel;

/// Rows with an unknown kind or out-of-range stars are reported as internal errors
impl TryFrom<ActionModel> for Action {
    type Error = DomainError;

    fn try_from(model: ActionModel) -> Result<Self, Self::Error> {
        let kind: ActionKind = model.kind.parse()?;
        let stars = model.stars.map(Stars::try_from).transpose().map_err(|e| {
            DomainError::InternalError(format!("action {} has bad stars: {e}", model.id))
        })?;

        Ok(Action {
            id: Snowflake::new(model.id),
            actor_id: ActorId::new(model.actor_id),
            project_id: Snowflake::new(model.project_id),
            kind,
            text: model.text,
            stars,
            delta: model.delta,
            reason: model.reason,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Convert a batch of rows, failing on the first malformed one
pub fn actions_from_models(models: Vec<ActionModel>) -> Result<Vec<Action>, DomainError> {
    models.into_iter().map(Action::try_from).collect()
}

/// Column values for inserting an action row
pub struct ActionInsert<'a> {
    pub id: i64,
    pub actor_id: i64,
    pub project_id: i64,
    pub kind: &'static str,
    pub text: Option<&'a str>,
    pub stars: Option<i16>,
    pub delta: i64,
    pub reason: Option<&'a str>,
}

impl<'a> ActionInsert<'a> {
    pub fn new(action: &'a Action) -> Self {
        Self {
            id: action.id.into_inner(),
            actor_id: action.actor_id.into_inner(),
            project_id: action.project_id.into_inner(),
            kind: action.kind.as_str(),
            text: action.text.as_deref(),
            stars: action.stars.map(|s| i16::from(s.get())),
            delta: action.delta,
            reason: action.reason.as_deref(),
        }
    }
}
