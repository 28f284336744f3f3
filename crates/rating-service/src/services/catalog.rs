//! Catalog service
//!
//! Read-side queries over projects, reviews and score history.

use rating_core::entities::ActionKind;
use rating_core::{ActorId, DomainError, ProjectQuery, ProjectSort, Snowflake};
use tracing::instrument;
use validator::Validate;

use crate::dto::{
    ActionResponse, ActorProfileResponse, CategoryResponse, HistoryResponse, ListProjectsQuery,
    PageResponse, ProjectDetailResponse, ProjectResponse, SearchQuery, StatsResponse,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const DEFAULT_SEARCH_LIMIT: i64 = 10;
pub const DETAIL_REVIEWS: i64 = 10;
pub const DETAIL_HISTORY: i64 = 5;
pub const TOP_PROJECTS: i64 = 5;
const MAX_HISTORY_LIMIT: i64 = 100;

/// Catalog service
pub struct CatalogService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CatalogService<'a> {
    /// Create a new CatalogService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Page through live projects
    #[instrument(skip(self))]
    pub async fn list_projects(
        &self,
        query: ListProjectsQuery,
    ) -> ServiceResult<PageResponse<ProjectResponse>> {
        query.validate()?;

        let category = query
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        let offset = query.offset.unwrap_or(0);

        let projects = self
            .ctx
            .project_repo()
            .list(&ProjectQuery {
                category: category.clone(),
                sort: query.sort,
                limit,
                offset,
            })
            .await?;
        let total = self.ctx.project_repo().count(category.as_deref()).await?;

        Ok(PageResponse::new(
            projects.into_iter().map(ProjectResponse::from).collect(),
            total,
            limit,
            offset,
        ))
    }

    /// A project with its latest reviews, like count and latest history
    #[instrument(skip(self))]
    pub async fn project_detail(&self, project_id: Snowflake) -> ServiceResult<ProjectDetailResponse> {
        let project = self
            .ctx
            .project_repo()
            .find_by_id(project_id)
            .await?
            .ok_or(DomainError::ProjectNotFound(project_id))?;

        let reviews = self
            .ctx
            .action_repo()
            .reviews_for_project(project_id, DETAIL_REVIEWS)
            .await?;
        let likes = self
            .ctx
            .action_repo()
            .count_by_kind(Some(project_id), ActionKind::Like)
            .await?;
        let history = self
            .ctx
            .history_repo()
            .find_by_project(project_id, DETAIL_HISTORY)
            .await?;

        Ok(ProjectDetailResponse {
            project: ProjectResponse::from(project),
            reviews: reviews.into_iter().map(ActionResponse::from).collect(),
            likes,
            history: history.into_iter().map(HistoryResponse::from).collect(),
        })
    }

    /// Case-insensitive search over names and descriptions, best score first
    #[instrument(skip(self))]
    pub async fn search(&self, query: SearchQuery) -> ServiceResult<Vec<ProjectResponse>> {
        let q = query.q.trim();
        let trimmed = SearchQuery {
            q: q.to_string(),
            limit: query.limit,
        };
        trimmed.validate()?;

        let projects = self
            .ctx
            .project_repo()
            .search(&trimmed.q, trimmed.limit.unwrap_or(DEFAULT_SEARCH_LIMIT))
            .await?;
        Ok(projects.into_iter().map(ProjectResponse::from).collect())
    }

    /// Live project count per category
    #[instrument(skip(self))]
    pub async fn categories(&self) -> ServiceResult<Vec<CategoryResponse>> {
        Ok(self.ctx.project_repo().categories().await?)
    }

    /// Totals and the best-scored projects
    #[instrument(skip(self))]
    pub async fn stats(&self) -> ServiceResult<StatsResponse> {
        let total_projects = self.ctx.project_repo().count(None).await?;
        let total_reviews = self
            .ctx
            .action_repo()
            .count_by_kind(None, ActionKind::Review)
            .await?;
        let total_likes = self
            .ctx
            .action_repo()
            .count_by_kind(None, ActionKind::Like)
            .await?;
        let top = self
            .ctx
            .project_repo()
            .list(&ProjectQuery {
                category: None,
                sort: ProjectSort::Score,
                limit: TOP_PROJECTS,
                offset: 0,
            })
            .await?;

        Ok(StatsResponse {
            total_projects,
            total_reviews,
            total_likes,
            top_projects: top.into_iter().map(ProjectResponse::from).collect(),
        })
    }

    /// Everything an actor has contributed to live projects
    #[instrument(skip(self))]
    pub async fn actor_profile(&self, actor_id: ActorId) -> ServiceResult<ActorProfileResponse> {
        let reviews = self
            .ctx
            .action_repo()
            .find_by_actor(actor_id, ActionKind::Review)
            .await?;
        let likes = self
            .ctx
            .action_repo()
            .find_by_actor(actor_id, ActionKind::Like)
            .await?;

        Ok(ActorProfileResponse {
            actor_id,
            reviews: reviews.into_iter().map(ActionResponse::from).collect(),
            liked_project_ids: likes.into_iter().map(|a| a.project_id).collect(),
        })
    }

    /// Newest score history of a project
    #[instrument(skip(self))]
    pub async fn project_history(
        &self,
        project_id: Snowflake,
        limit: i64,
    ) -> ServiceResult<Vec<HistoryResponse>> {
        if !(1..=MAX_HISTORY_LIMIT).contains(&limit) {
            return Err(ServiceError::validation(format!(
                "Limit must be between 1 and {MAX_HISTORY_LIMIT}"
            )));
        }

        self.ctx
            .project_repo()
            .find_by_id(project_id)
            .await?
            .ok_or(DomainError::ProjectNotFound(project_id))?;

        let records = self
            .ctx
            .history_repo()
            .find_by_project(project_id, limit)
            .await?;
        Ok(records.into_iter().map(HistoryResponse::from).collect())
    }
}
