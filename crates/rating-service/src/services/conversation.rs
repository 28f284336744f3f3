//! Review conversation state machine
//!
//! A review is collected in two steps (text, then stars) before it reaches
//! the ledger. Each actor owns at most one slot; states are an explicit enum
//! and [`transition`] is pure, so the store only has to swap slots.

use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rating_core::entities::{ActionPayload, Project};
use rating_core::ledger::validate_review_text;
use rating_core::{ActorId, DomainError, LedgerReceipt, Snowflake, Stars};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::ledger::LedgerService;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingReviewText {
        project_id: Snowflake,
    },
    AwaitingStarRating {
        project_id: Snowflake,
        text: String,
    },
}

impl ConversationState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Idle => "no review in progress",
            Self::AwaitingReviewText { .. } => "waiting for review text",
            Self::AwaitingStarRating { .. } => "waiting for a star rating",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationInput {
    StartReview(Snowflake),
    Text(String),
    Stars(Stars),
    Cancel,
}

/// A finished review ready for the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    pub project_id: Snowflake,
    pub text: String,
    pub stars: Stars,
}

impl From<ReviewDraft> for ActionPayload {
    fn from(draft: ReviewDraft) -> Self {
        ActionPayload::Review {
            text: draft.text,
            stars: draft.stars,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub next: ConversationState,
    pub commit: Option<ReviewDraft>,
}

impl Step {
    fn to(next: ConversationState) -> Self {
        Self { next, commit: None }
    }
}

/// Compute the next state; an `Err` leaves the conversation where it was
pub fn transition(state: &ConversationState, input: ConversationInput) -> ServiceResult<Step> {
    use ConversationInput as In;
    use ConversationState as S;

    match (state, input) {
        (_, In::Cancel) => Ok(Step::to(S::Idle)),
        (_, In::StartReview(project_id)) => Ok(Step::to(S::AwaitingReviewText { project_id })),
        (S::AwaitingReviewText { project_id }, In::Text(text)) => {
            let text = text.trim();
            validate_review_text(text)?;
            Ok(Step::to(S::AwaitingStarRating {
                project_id: *project_id,
                text: text.to_string(),
            }))
        }
        (S::AwaitingStarRating { project_id, text }, In::Stars(stars)) => Ok(Step {
            next: S::Idle,
            commit: Some(ReviewDraft {
                project_id: *project_id,
                text: text.clone(),
                stars,
            }),
        }),
        (state, In::Text(_)) => Err(ServiceError::unexpected(format!(
            "text received while {}",
            state.describe()
        ))),
        (state, In::Stars(_)) => Err(ServiceError::unexpected(format!(
            "stars received while {}",
            state.describe()
        ))),
    }
}

struct Slot {
    state: ConversationState,
    touched: Instant,
}

/// Per-actor conversation slots with idle expiry
///
/// Expired slots are evicted lazily when their actor shows up again and in
/// bulk by [`sweep_expired`](Self::sweep_expired).
pub struct ConversationStore {
    slots: DashMap<ActorId, Slot>,
    idle_ttl: Duration,
}

impl ConversationStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            slots: DashMap::new(),
            idle_ttl,
        }
    }

    fn is_expired(&self, slot: &Slot, now: Instant) -> bool {
        now.saturating_duration_since(slot.touched) >= self.idle_ttl
    }

    /// Current state of an actor's conversation
    pub fn state(&self, actor_id: ActorId) -> ConversationState {
        let now = Instant::now();
        match self.slots.entry(actor_id) {
            Entry::Occupied(entry) if self.is_expired(entry.get(), now) => {
                entry.remove();
                ConversationState::Idle
            }
            Entry::Occupied(entry) => entry.get().state.clone(),
            Entry::Vacant(_) => ConversationState::Idle,
        }
    }

    /// Feed one input to an actor's conversation
    ///
    /// Read, transition and write happen under the slot's shard lock.
    pub fn apply(&self, actor_id: ActorId, input: ConversationInput) -> ServiceResult<Step> {
        let now = Instant::now();
        match self.slots.entry(actor_id) {
            Entry::Occupied(mut entry) => {
                let expired = self.is_expired(entry.get(), now);
                let current = if expired {
                    ConversationState::Idle
                } else {
                    entry.get().state.clone()
                };

                let step = match transition(&current, input) {
                    Ok(step) => step,
                    Err(err) => {
                        if expired {
                            entry.remove();
                            debug!(%actor_id, "Evicted expired conversation");
                        }
                        return Err(err);
                    }
                };

                if step.next.is_idle() {
                    entry.remove();
                } else {
                    entry.insert(Slot {
                        state: step.next.clone(),
                        touched: now,
                    });
                }
                Ok(step)
            }
            Entry::Vacant(entry) => {
                let step = transition(&ConversationState::Idle, input)?;
                if !step.next.is_idle() {
                    entry.insert(Slot {
                        state: step.next.clone(),
                        touched: now,
                    });
                }
                Ok(step)
            }
        }
    }

    /// Drop an actor's conversation; true when one was in progress
    pub fn reset(&self, actor_id: ActorId) -> bool {
        self.slots.remove(&actor_id).is_some()
    }

    /// Evict every expired conversation, returning how many went
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.slots.len();
        self.slots.retain(|_, slot| !self.is_expired(slot, now));
        before.saturating_sub(self.slots.len())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Conversation service
pub struct ConversationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ConversationService<'a> {
    /// Create a new ConversationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Begin (or restart) a review of a live project
    #[instrument(skip(self))]
    pub async fn start_review(
        &self,
        actor_id: ActorId,
        project_id: Snowflake,
    ) -> ServiceResult<Project> {
        let project = self
            .ctx
            .project_repo()
            .find_by_id(project_id)
            .await?
            .ok_or(DomainError::ProjectNotFound(project_id))?;

        self.ctx
            .conversations()
            .apply(actor_id, ConversationInput::StartReview(project_id))?;

        debug!(%actor_id, %project_id, "Review started");
        Ok(project)
    }

    /// Record the review text
    #[instrument(skip(self, text))]
    pub fn submit_text(&self, actor_id: ActorId, text: String) -> ServiceResult<Snowflake> {
        let step = self
            .ctx
            .conversations()
            .apply(actor_id, ConversationInput::Text(text))?;

        match step.next {
            ConversationState::AwaitingStarRating { project_id, .. } => Ok(project_id),
            _ => Err(ServiceError::internal("review text did not advance the conversation")),
        }
    }

    /// Finish the review and commit it
    ///
    /// The conversation is back to idle before the ledger runs, so a failed
    /// commit still ends it.
    #[instrument(skip(self))]
    pub async fn submit_stars(&self, actor_id: ActorId, stars: Stars) -> ServiceResult<LedgerReceipt> {
        let step = self
            .ctx
            .conversations()
            .apply(actor_id, ConversationInput::Stars(stars))?;

        let draft = step
            .commit
            .ok_or_else(|| ServiceError::internal("star rating produced no review"))?;
        let project_id = draft.project_id;

        let receipt = LedgerService::new(self.ctx)
            .apply_action(actor_id, project_id, draft.into())
            .await?;

        info!(%actor_id, %project_id, %stars, new_score = receipt.new_score, "Review committed");
        Ok(receipt)
    }

    /// Abandon any review in progress; true when one was discarded
    pub fn cancel(&self, actor_id: ActorId) -> bool {
        self.ctx.conversations().reset(actor_id)
    }

    pub fn state(&self, actor_id: ActorId) -> ConversationState {
        self.ctx.conversations().state(actor_id)
    }

    /// True when the actor's next meaningful input is a star rating
    pub fn expects_stars(&self, actor_id: ActorId) -> bool {
        matches!(
            self.state(actor_id),
            ConversationState::AwaitingStarRating { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{memory_context, seed_project};

    fn stars(n: u8) -> Stars {
        Stars::new(n).unwrap()
    }

    #[test]
    fn test_happy_path_transitions() {
        let p = Snowflake::new(10);
        let step = transition(&ConversationState::Idle, ConversationInput::StartReview(p)).unwrap();
        assert_eq!(step.next, ConversationState::AwaitingReviewText { project_id: p });

        let step = transition(&step.next, ConversationInput::Text("  solid tool ".into())).unwrap();
        assert_eq!(
            step.next,
            ConversationState::AwaitingStarRating {
                project_id: p,
                text: "solid tool".into()
            }
        );

        let step = transition(&step.next, ConversationInput::Stars(stars(4))).unwrap();
        assert!(step.next.is_idle());
        assert_eq!(
            step.commit,
            Some(ReviewDraft {
                project_id: p,
                text: "solid tool".into(),
                stars: stars(4)
            })
        );
    }

    #[test]
    fn test_unexpected_inputs() {
        let p = Snowflake::new(10);
        let idle = ConversationState::Idle;
        let awaiting_text = ConversationState::AwaitingReviewText { project_id: p };
        let awaiting_stars = ConversationState::AwaitingStarRating {
            project_id: p,
            text: "ok".into(),
        };

        for (state, input) in [
            (&idle, ConversationInput::Stars(stars(3))),
            (&idle, ConversationInput::Text("hello".into())),
            (&awaiting_text, ConversationInput::Stars(stars(3))),
            (&awaiting_stars, ConversationInput::Text("more".into())),
        ] {
            let err = transition(state, input).unwrap_err();
            assert!(matches!(err, ServiceError::UnexpectedInput(_)), "{err}");
        }
    }

    #[test]
    fn test_blank_and_oversized_text_rejected() {
        let state = ConversationState::AwaitingReviewText {
            project_id: Snowflake::new(1),
        };

        let err = transition(&state, ConversationInput::Text("   ".into())).unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::EmptyReviewText)));

        let long = "x".repeat(2001);
        let err = transition(&state, ConversationInput::Text(long)).unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::ContentTooLong { .. })));
    }

    #[test]
    fn test_cancel_and_restart_from_any_state() {
        let awaiting_stars = ConversationState::AwaitingStarRating {
            project_id: Snowflake::new(1),
            text: "ok".into(),
        };

        let step = transition(&awaiting_stars, ConversationInput::Cancel).unwrap();
        assert!(step.next.is_idle());
        assert!(step.commit.is_none());

        let step = transition(&awaiting_stars, ConversationInput::StartReview(Snowflake::new(2))).unwrap();
        assert_eq!(
            step.next,
            ConversationState::AwaitingReviewText {
                project_id: Snowflake::new(2)
            }
        );
    }

    #[test]
    fn test_store_leaves_state_on_error() {
        let store = ConversationStore::new(Duration::from_secs(60));
        let actor = ActorId::new(1);

        store
            .apply(actor, ConversationInput::StartReview(Snowflake::new(5)))
            .unwrap();
        assert!(store.apply(actor, ConversationInput::Stars(stars(5))).is_err());
        assert_eq!(
            store.state(actor),
            ConversationState::AwaitingReviewText {
                project_id: Snowflake::new(5)
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_conversation_expires_lazily() {
        let store = ConversationStore::new(Duration::from_secs(60));
        let actor = ActorId::new(1);
        store
            .apply(actor, ConversationInput::StartReview(Snowflake::new(5)))
            .unwrap();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(!store.state(actor).is_idle());

        tokio::time::advance(Duration::from_secs(2)).await;
        let err = store
            .apply(actor, ConversationInput::Text("late".into()))
            .unwrap_err();
        assert!(matches!(err, ServiceError::UnexpectedInput(_)));
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_evicts_only_expired() {
        let store = ConversationStore::new(Duration::from_secs(60));
        store
            .apply(ActorId::new(1), ConversationInput::StartReview(Snowflake::new(5)))
            .unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;
        store
            .apply(ActorId::new(2), ConversationInput::StartReview(Snowflake::new(5)))
            .unwrap();

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(store.sweep_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.state(ActorId::new(1)).is_idle());
        assert!(!store.state(ActorId::new(2)).is_idle());
    }

    #[tokio::test]
    async fn test_review_flow_commits_through_ledger() {
        let (ctx, _store, _sink) = memory_context();
        let project = seed_project(&ctx, "ripgrep").await;
        let actor = ActorId::new(100);
        let service = ConversationService::new(&ctx);

        service.start_review(actor, project.id).await.unwrap();
        service.submit_text(actor, "fast".into()).unwrap();
        assert!(service.expects_stars(actor));

        let receipt = service.submit_stars(actor, stars(5)).await.unwrap();
        assert_eq!(receipt.new_score, 5);
        assert!(service.state(actor).is_idle());
    }

    #[tokio::test]
    async fn test_start_review_of_missing_project_keeps_state() {
        let (ctx, _store, _sink) = memory_context();
        let project = seed_project(&ctx, "fd").await;
        let actor = ActorId::new(100);
        let service = ConversationService::new(&ctx);

        service.start_review(actor, project.id).await.unwrap();
        let err = service
            .start_review(actor, Snowflake::new(404))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::ProjectNotFound(_))));
        assert_eq!(
            service.state(actor),
            ConversationState::AwaitingReviewText {
                project_id: project.id
            }
        );
    }

    #[tokio::test]
    async fn test_failed_commit_still_ends_conversation() {
        let (ctx, _store, _sink) = memory_context();
        let project = seed_project(&ctx, "bat").await;
        let actor = ActorId::new(100);
        let service = ConversationService::new(&ctx);

        service.start_review(actor, project.id).await.unwrap();
        service.submit_text(actor, "nice".into()).unwrap();
        ctx.project_repo().delete(project.id).await.unwrap();

        let err = service.submit_stars(actor, stars(3)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::ProjectNotFound(_))));
        assert!(service.state(actor).is_idle());
    }
}
