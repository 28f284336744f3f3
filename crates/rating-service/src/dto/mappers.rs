//! Entity to DTO conversions

use rating_core::entities::{Action, HistoryRecord, Project};

use super::responses::{ActionResponse, HistoryResponse, ProjectResponse};

impl From<&Project> for ProjectResponse {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            name: project.name.clone(),
            category: project.category.clone(),
            description: project.description.clone(),
            score: project.score,
            created_at: project.created_at,
        }
    }
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            category: project.category,
            description: project.description,
            score: project.score,
            created_at: project.created_at,
        }
    }
}

impl From<Action> for ActionResponse {
    fn from(action: Action) -> Self {
        Self {
            id: action.id,
            actor_id: action.actor_id,
            project_id: action.project_id,
            kind: action.kind,
            text: action.text,
            stars: action.stars.map(|s| s.get()),
            delta: action.delta,
            reason: action.reason,
            created_at: action.created_at,
        }
    }
}

impl From<HistoryRecord> for HistoryResponse {
    fn from(record: HistoryRecord) -> Self {
        Self {
            id: record.id,
            project_id: record.project_id,
            actor_id: record.actor_id,
            admin_id: record.admin_id,
            kind: record.kind,
            score_before: record.score_before,
            score_after: record.score_after,
            delta: record.delta,
            reason: record.reason,
            is_admin_action: record.is_admin_action,
            related_action_id: record.related_action_id,
            created_at: record.created_at,
        }
    }
}
