//! Test fixtures and event builders
//!
//! Provides reusable actors and payloads for integration tests.

use std::sync::atomic::{AtomicI64, Ordering};

use rating_core::{ActorId, Snowflake};
use rating_service::dto::{
    Actor, AddProjectRequest, AdjustScoreRequest, AdminCommand, BanRequest, InboundPayload,
    RemoveReviewRequest,
};

/// Counter for unique actor ids and names
static COUNTER: AtomicI64 = AtomicI64::new(1_000);

/// Get a unique suffix for test data
pub fn unique_suffix() -> i64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

pub fn user() -> Actor {
    Actor::user(ActorId::new(unique_suffix()))
}

pub fn admin() -> Actor {
    Actor::admin(ActorId::new(unique_suffix()))
}

pub fn unique_name(prefix: &str) -> String {
    format!("{prefix}-{}", unique_suffix())
}

pub fn like(project_id: Snowflake) -> InboundPayload {
    InboundPayload::Like { project_id }
}

pub fn start_review(project_id: Snowflake) -> InboundPayload {
    InboundPayload::StartReview { project_id }
}

pub fn text(text: &str) -> InboundPayload {
    InboundPayload::Text {
        text: text.to_string(),
    }
}

pub fn stars(value: &str) -> InboundPayload {
    InboundPayload::Stars {
        value: value.to_string(),
    }
}

fn admin_payload(command: AdminCommand) -> InboundPayload {
    InboundPayload::Admin { command }
}

pub fn add_project(name: &str, category: &str) -> InboundPayload {
    admin_payload(AdminCommand::AddProject(AddProjectRequest {
        name: name.to_string(),
        category: category.to_string(),
        description: None,
    }))
}

pub fn adjust_score(project_name: &str, delta: i64, reason: &str) -> InboundPayload {
    admin_payload(AdminCommand::AdjustScore(AdjustScoreRequest {
        project_name: project_name.to_string(),
        delta,
        reason: reason.to_string(),
    }))
}

pub fn remove_review(action_id: Snowflake) -> InboundPayload {
    admin_payload(AdminCommand::RemoveReview(RemoveReviewRequest {
        action_id,
        reason: None,
    }))
}

pub fn ban(actor_id: ActorId) -> InboundPayload {
    admin_payload(AdminCommand::Ban(BanRequest {
        actor_id,
        reason: Some("spam".to_string()),
    }))
}

pub fn unban(actor_id: ActorId) -> InboundPayload {
    admin_payload(AdminCommand::Unban { actor_id })
}
