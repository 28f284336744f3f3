//! Admin service
//!
//! Privileged commands: project catalog upkeep, manual score changes,
//! contribution removal and the ban list. Every method checks privileges
//! itself; none of them pass through the access gate.

use chrono::Utc;
use rating_core::entities::{ActionPayload, Ban, Project};
use rating_core::events::{
    ActorBannedEvent, ActorUnbannedEvent, ProjectAddedEvent, ProjectRemovedEvent,
};
use rating_core::{ActorId, DomainError, LedgerEvent, LedgerReceipt, Snowflake};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{
    Actor, AddProjectRequest, AdjustScoreRequest, AdminCommand, AdminReply, AdminStatsResponse,
    BanRequest, ProjectResponse, RemoveReviewRequest,
};

use super::catalog::CatalogService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::ledger::{publish_best_effort, LedgerService};

/// Admin service
pub struct AdminService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AdminService<'a> {
    /// Create a new AdminService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Run one admin command
    pub async fn execute(&self, admin: &Actor, command: AdminCommand) -> ServiceResult<AdminReply> {
        match command {
            AdminCommand::AddProject(request) => {
                let project = self.add_project(admin, request).await?;
                Ok(AdminReply::ProjectAdded { project })
            }
            AdminCommand::RemoveProject { project_id } => {
                self.remove_project(admin, project_id).await?;
                Ok(AdminReply::ProjectRemoved { project_id })
            }
            AdminCommand::AdjustScore(request) => {
                let receipt = self.adjust_score(admin, request).await?;
                Ok(AdminReply::ScoreAdjusted { receipt })
            }
            AdminCommand::RemoveReview(request) => {
                let receipt = self.remove_review(admin, request).await?;
                Ok(AdminReply::ContributionRemoved { receipt })
            }
            AdminCommand::Ban(request) => {
                let actor_id = request.actor_id;
                self.ban(admin, request).await?;
                Ok(AdminReply::Banned { actor_id })
            }
            AdminCommand::Unban { actor_id } => {
                let was_banned = self.unban(admin, actor_id).await?;
                Ok(AdminReply::Unbanned {
                    actor_id,
                    was_banned,
                })
            }
            AdminCommand::Stats => {
                let stats = self.stats(admin).await?;
                Ok(AdminReply::Stats { stats })
            }
        }
    }

    /// Add a project to the catalog with a zero score
    #[instrument(skip(self, request), fields(admin_id = %admin.id))]
    pub async fn add_project(
        &self,
        admin: &Actor,
        request: AddProjectRequest,
    ) -> ServiceResult<ProjectResponse> {
        require_privileged(admin)?;
        let request = AddProjectRequest {
            name: request.name.trim().to_string(),
            category: request.category.trim().to_string(),
            description: request
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        };
        request.validate()?;

        let project = Project::new(self.ctx.generate_id(), request.name, request.category)
            .with_description(request.description);
        self.ctx.project_repo().create(&project).await?;

        info!(project_id = %project.id, name = %project.name, "Project added");

        let event = LedgerEvent::ProjectAdded(ProjectAddedEvent {
            project_id: project.id,
            name: project.name.clone(),
            category: project.category.clone(),
            admin_id: admin.id,
            timestamp: Utc::now(),
        });
        publish_best_effort(self.ctx, &event).await;

        Ok(ProjectResponse::from(project))
    }

    /// Soft delete a project; it stops accepting contributions
    #[instrument(skip(self), fields(admin_id = %admin.id))]
    pub async fn remove_project(&self, admin: &Actor, project_id: Snowflake) -> ServiceResult<()> {
        require_privileged(admin)?;

        self.ctx
            .project_repo()
            .find_by_id(project_id)
            .await?
            .ok_or(DomainError::ProjectNotFound(project_id))?;
        self.ctx.project_repo().delete(project_id).await?;

        info!(project_id = %project_id, "Project removed");

        let event = LedgerEvent::ProjectRemoved(ProjectRemovedEvent {
            project_id,
            admin_id: admin.id,
            timestamp: Utc::now(),
        });
        publish_best_effort(self.ctx, &event).await;

        Ok(())
    }

    /// Apply a signed manual adjustment to a project found by name
    #[instrument(skip(self, request), fields(admin_id = %admin.id))]
    pub async fn adjust_score(
        &self,
        admin: &Actor,
        request: AdjustScoreRequest,
    ) -> ServiceResult<LedgerReceipt> {
        require_privileged(admin)?;
        request.validate()?;

        let name = request.project_name.trim();
        let project = self
            .ctx
            .project_repo()
            .find_by_name(name)
            .await?
            .ok_or_else(|| DomainError::ProjectNameNotFound(name.to_string()))?;

        LedgerService::new(self.ctx)
            .apply_action(
                admin.id,
                project.id,
                ActionPayload::AdminAdjustment {
                    delta: request.delta,
                    reason: request.reason,
                },
            )
            .await
    }

    /// Reverse a contribution through the ledger
    #[instrument(skip(self, request), fields(admin_id = %admin.id))]
    pub async fn remove_review(
        &self,
        admin: &Actor,
        request: RemoveReviewRequest,
    ) -> ServiceResult<LedgerReceipt> {
        require_privileged(admin)?;
        request.validate()?;

        let reason = request
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        LedgerService::new(self.ctx)
            .reverse_action(admin.id, request.action_id, reason)
            .await
    }

    /// Ban an actor; their next events are dropped silently
    #[instrument(skip(self, request), fields(admin_id = %admin.id))]
    pub async fn ban(&self, admin: &Actor, request: BanRequest) -> ServiceResult<()> {
        require_privileged(admin)?;
        request.validate()?;

        let ban = Ban::new(request.actor_id, admin.id, request.reason);
        self.ctx.ban_repo().create(&ban).await?;
        self.ctx.conversations().reset(ban.actor_id);

        info!(actor_id = %ban.actor_id, "Actor banned");

        let event = LedgerEvent::ActorBanned(ActorBannedEvent {
            actor_id: ban.actor_id,
            admin_id: admin.id,
            reason: ban.reason,
            timestamp: Utc::now(),
        });
        publish_best_effort(self.ctx, &event).await;

        Ok(())
    }

    /// Lift a ban; false when the actor was not banned
    #[instrument(skip(self), fields(admin_id = %admin.id))]
    pub async fn unban(&self, admin: &Actor, actor_id: ActorId) -> ServiceResult<bool> {
        require_privileged(admin)?;

        let existed = self.ctx.ban_repo().delete(actor_id).await?;
        if existed {
            info!(actor_id = %actor_id, "Actor unbanned");
            let event = LedgerEvent::ActorUnbanned(ActorUnbannedEvent {
                actor_id,
                admin_id: admin.id,
                timestamp: Utc::now(),
            });
            publish_best_effort(self.ctx, &event).await;
        }
        Ok(existed)
    }

    /// Catalog totals plus ban and archive counts
    #[instrument(skip(self), fields(admin_id = %admin.id))]
    pub async fn stats(&self, admin: &Actor) -> ServiceResult<AdminStatsResponse> {
        require_privileged(admin)?;

        let catalog = CatalogService::new(self.ctx).stats().await?;
        let banned_actors = self.ctx.ban_repo().list().await?.len();
        let archived_history = self.ctx.history_repo().count_archived().await?;

        Ok(AdminStatsResponse {
            catalog,
            banned_actors,
            archived_history,
        })
    }
}

fn require_privileged(actor: &Actor) -> ServiceResult<()> {
    if actor.is_privileged {
        Ok(())
    } else {
        Err(ServiceError::PermissionDenied)
    }
}
