//! Event dispatcher
//!
//! Single entry point for inbound actor events. Every event is answered
//! with a `Reply`; failures become `Reply::Error` and never escape.

use rating_common::{AppError, ErrorResponse};
use rating_core::{ActionPayload, Snowflake, Stars};
use tracing::{debug, error, instrument};

use crate::dto::{Actor, AdminCommand, InboundEvent, InboundPayload, ProjectResponse, Reply};

use super::admin::AdminService;
use super::context::ServiceContext;
use super::conversation::ConversationService;
use super::error::{ServiceError, ServiceResult};
use super::gate::{GateDecision, GateScope};
use super::ledger::LedgerService;

/// Routes inbound events to the gate, conversations, ledger and admin services
#[derive(Clone)]
pub struct Dispatcher {
    ctx: ServiceContext,
}

impl Dispatcher {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    /// Handle one event and produce the reply for its conversation
    #[instrument(
        skip(self, event),
        fields(actor_id = %event.actor.id, conversation_id = event.conversation_id)
    )]
    pub async fn dispatch(&self, event: InboundEvent) -> Reply {
        let InboundEvent { actor, payload, .. } = event;

        match self.route(&actor, payload).await {
            Ok(reply) => reply,
            Err(err) => {
                let err = AppError::from(err);
                if err.is_server_error() {
                    error!(error = %err, "Event handling failed");
                } else {
                    debug!(code = err.error_code(), "Event rejected");
                }
                Reply::Error {
                    error: ErrorResponse::from(err),
                }
            }
        }
    }

    /// Drop conversations idle past their lifetime
    pub fn sweep_conversations(&self) -> usize {
        self.ctx.conversations().sweep_expired()
    }

    async fn route(&self, actor: &Actor, payload: InboundPayload) -> ServiceResult<Reply> {
        match payload {
            InboundPayload::Greeting => {
                if let Some(reply) = self.gate(actor, GateScope::Conversation).await? {
                    return Ok(reply);
                }
                self.ctx.conversations().reset(actor.id);
                Ok(Reply::Greeting)
            }
            InboundPayload::Admin { command } => self.admin(actor, command).await,
            InboundPayload::Cancel => {
                if let Some(reply) = self.gate(actor, GateScope::Conversation).await? {
                    return Ok(reply);
                }
                let had_review = ConversationService::new(&self.ctx).cancel(actor.id);
                Ok(Reply::Cancelled { had_review })
            }
            InboundPayload::Like { project_id } => self.like(actor, project_id).await,
            InboundPayload::StartReview { project_id } => {
                if let Some(reply) = self.gate(actor, GateScope::Conversation).await? {
                    return Ok(reply);
                }
                let project = ConversationService::new(&self.ctx)
                    .start_review(actor.id, project_id)
                    .await?;
                Ok(Reply::ReviewStarted {
                    project: ProjectResponse::from(project),
                })
            }
            InboundPayload::Text { text } => {
                if let Some(reply) = self.gate(actor, GateScope::Conversation).await? {
                    return Ok(reply);
                }
                let project_id = ConversationService::new(&self.ctx).submit_text(actor.id, text)?;
                Ok(Reply::AwaitingStars { project_id })
            }
            InboundPayload::Stars { value } => self.stars(actor, &value).await,
        }
    }

    /// Privileged actors bypass the gate; anyone else is ban checked and
    /// then refused by the admin service
    async fn admin(&self, actor: &Actor, command: AdminCommand) -> ServiceResult<Reply> {
        if actor.is_privileged {
            self.ctx.conversations().reset(actor.id);
        } else if let Some(reply) = self.gate(actor, GateScope::Conversation).await? {
            return Ok(reply);
        }
        let reply = AdminService::new(&self.ctx).execute(actor, command).await?;
        Ok(Reply::Admin { reply })
    }

    async fn like(&self, actor: &Actor, project_id: Snowflake) -> ServiceResult<Reply> {
        if let Some(reply) = self.gate(actor, GateScope::Mutation).await? {
            return Ok(reply);
        }
        self.ctx.conversations().reset(actor.id);

        let receipt = LedgerService::new(&self.ctx)
            .apply_action(actor.id, project_id, ActionPayload::Like)
            .await?;
        Ok(Reply::Liked { receipt })
    }

    /// Stars only count while a review waits for them; the cooldown is
    /// consumed only when a commit will follow
    async fn stars(&self, actor: &Actor, value: &str) -> ServiceResult<Reply> {
        if let Some(reply) = self.gate(actor, GateScope::Conversation).await? {
            return Ok(reply);
        }

        let conversations = ConversationService::new(&self.ctx);
        if !conversations.expects_stars(actor.id) {
            return Err(ServiceError::unexpected("no review is waiting for a star rating"));
        }
        let stars = Stars::parse(value)?;

        if let GateDecision::Throttled { retry_after_secs } =
            self.ctx.gate().check_cooldown(actor).await?
        {
            return Ok(Reply::Throttled { retry_after_secs });
        }

        let receipt = conversations.submit_stars(actor.id, stars).await?;
        Ok(Reply::ReviewCommitted { receipt })
    }

    /// None when the event may proceed, otherwise the reply that ends it
    async fn gate(&self, actor: &Actor, scope: GateScope) -> ServiceResult<Option<Reply>> {
        Ok(match self.ctx.gate().admit(actor, scope).await? {
            GateDecision::Admit => None,
            GateDecision::Silent => Some(Reply::Silent),
            GateDecision::Throttled { retry_after_secs } => {
                Some(Reply::Throttled { retry_after_secs })
            }
        })
    }
}
