//! Pure ledger planning
//!
//! Given a request and the prior action it depends on, decide the delta, the
//! action-row write and the history entry. Stores call [`plan`] while holding
//! the project lock and then apply the result verbatim.

use chrono::{DateTime, Utc};

use crate::entities::{Action, ActionKind, ActionPayload, HistoryKind, HistoryRecord};
use crate::error::DomainError;
use crate::ledger::{LedgerOp, LedgerReceipt, LedgerRequest};
use crate::value_objects::{ActorId, RatingCurve, Snowflake, Stars};

/// Longest accepted review text, in characters
pub const MAX_REVIEW_CHARS: usize = 2000;

/// Change to the action table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionWrite {
    Insert(Action),
    /// Review edit; `delta` is the new current value of the review
    Update {
        id: Snowflake,
        text: String,
        stars: Stars,
        delta: i64,
        at: DateTime<Utc>,
    },
    Delete { id: Snowflake },
}

impl ActionWrite {
    pub fn action_id(&self) -> Snowflake {
        match self {
            Self::Insert(action) => action.id,
            Self::Update { id, .. } | Self::Delete { id } => *id,
        }
    }
}

/// Everything a store needs to commit one mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub project_id: Snowflake,
    /// Amount added to the project score
    pub delta: i64,
    pub write: ActionWrite,
    pub kind: HistoryKind,
    pub actor_id: Option<ActorId>,
    pub admin_id: Option<ActorId>,
    pub reason: String,
    pub related_action_id: Option<Snowflake>,
}

impl Plan {
    /// Score after applying this plan
    pub fn score_after(&self, score_before: i64) -> Result<i64, DomainError> {
        score_before
            .checked_add(self.delta)
            .ok_or_else(|| DomainError::InternalError("score overflow".to_string()))
    }

    pub fn history_record(
        &self,
        id: Snowflake,
        score_before: i64,
        at: DateTime<Utc>,
    ) -> Result<HistoryRecord, DomainError> {
        Ok(HistoryRecord {
            id,
            project_id: self.project_id,
            actor_id: self.actor_id,
            admin_id: self.admin_id,
            kind: self.kind,
            score_before,
            score_after: self.score_after(score_before)?,
            delta: self.delta,
            reason: self.reason.clone(),
            is_admin_action: self.admin_id.is_some(),
            related_action_id: self.related_action_id,
            created_at: at,
        })
    }

    pub fn receipt(&self, history: &HistoryRecord) -> LedgerReceipt {
        LedgerReceipt {
            project_id: self.project_id,
            contribution_id: self.write.action_id(),
            history_id: history.id,
            outcome: self.kind,
            delta: self.delta,
            score_before: history.score_before,
            new_score: history.score_after,
            actor_id: self.actor_id,
            admin_id: self.admin_id,
            reason: self.reason.clone(),
        }
    }
}

/// Plan a request against the prior action located by its
/// [`PriorLookup`](crate::ledger::PriorLookup)
pub fn plan(request: &LedgerRequest, prior: Option<&Action>) -> Result<Plan, DomainError> {
    match &request.op {
        LedgerOp::Contribute {
            actor_id,
            project_id,
            payload,
        } => {
            validate_payload(payload)?;
            let fresh = || {
                Action::from_payload(request.action_id, *actor_id, *project_id, payload, request.at)
            };

            match payload {
                ActionPayload::Like => {
                    if prior.is_some() {
                        return Err(DomainError::DuplicateContribution(ActionKind::Like));
                    }
                    Ok(Plan {
                        project_id: *project_id,
                        delta: 1,
                        write: ActionWrite::Insert(fresh()),
                        kind: HistoryKind::AddLike,
                        actor_id: Some(*actor_id),
                        admin_id: None,
                        reason: "Like from user".to_string(),
                        related_action_id: None,
                    })
                }
                ActionPayload::Review { text, stars } => match prior {
                    Some(existing) => {
                        let before = existing.stars.ok_or_else(|| {
                            DomainError::InternalError(format!(
                                "review {} has no stars",
                                existing.id
                            ))
                        })?;
                        Ok(Plan {
                            project_id: *project_id,
                            delta: RatingCurve::edit_delta(before, *stars),
                            write: ActionWrite::Update {
                                id: existing.id,
                                text: text.trim().to_string(),
                                stars: *stars,
                                delta: stars.weight(),
                                at: request.at,
                            },
                            kind: HistoryKind::UpdateReview,
                            actor_id: Some(*actor_id),
                            admin_id: None,
                            reason: format!("Review edited: {before} → {stars}"),
                            related_action_id: Some(existing.id),
                        })
                    }
                    None => {
                        let mut action = fresh();
                        action.text = Some(text.trim().to_string());
                        Ok(Plan {
                            project_id: *project_id,
                            delta: stars.weight(),
                            write: ActionWrite::Insert(action),
                            kind: HistoryKind::NewReview,
                            actor_id: Some(*actor_id),
                            admin_id: None,
                            reason: format!("New review: {stars}"),
                            related_action_id: None,
                        })
                    }
                },
                ActionPayload::AdminAdjustment { delta, reason } => {
                    let mut action = fresh();
                    action.reason = Some(reason.trim().to_string());
                    Ok(Plan {
                        project_id: *project_id,
                        delta: *delta,
                        write: ActionWrite::Insert(action),
                        kind: HistoryKind::AdminAdjustment,
                        actor_id: None,
                        admin_id: Some(*actor_id),
                        reason: reason.trim().to_string(),
                        related_action_id: None,
                    })
                }
            }
        }
        LedgerOp::Reverse {
            admin_id,
            action_id,
            reason,
        } => {
            let target = prior
                .filter(|a| a.id == *action_id)
                .ok_or(DomainError::ActionNotFound(*action_id))?;
            let reason = reason
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map_or_else(
                    || format!("{} removed by administrator", capitalized(target.kind)),
                    str::to_string,
                );

            Ok(Plan {
                project_id: target.project_id,
                delta: -target.delta,
                write: ActionWrite::Delete { id: target.id },
                kind: HistoryKind::removal_of(target.kind),
                actor_id: match target.kind {
                    ActionKind::AdminAdjustment => None,
                    _ => Some(target.actor_id),
                },
                admin_id: Some(*admin_id),
                reason,
                related_action_id: Some(target.id),
            })
        }
    }
}

fn validate_payload(payload: &ActionPayload) -> Result<(), DomainError> {
    match payload {
        ActionPayload::Like => Ok(()),
        ActionPayload::Review { text, .. } => validate_review_text(text),
        ActionPayload::AdminAdjustment { delta, reason } => {
            if *delta == 0 {
                return Err(DomainError::ZeroAdjustment);
            }
            if reason.trim().is_empty() {
                return Err(DomainError::EmptyReason);
            }
            Ok(())
        }
    }
}

/// Review text must be non-blank and at most [`MAX_REVIEW_CHARS`] characters
pub fn validate_review_text(text: &str) -> Result<(), DomainError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyReviewText);
    }
    if trimmed.chars().count() > MAX_REVIEW_CHARS {
        return Err(DomainError::ContentTooLong {
            max: MAX_REVIEW_CHARS,
        });
    }
    Ok(())
}

fn capitalized(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::Like => "Like",
        ActionKind::Review => "Review",
        ActionKind::AdminAdjustment => "Adjustment",
    }
}
