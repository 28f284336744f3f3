//! Data transfer objects for inbound events, queries and replies
//!
//! This module provides:
//! - Inbound events and request DTOs with validation
//! - Reply and response DTOs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    Actor, AddProjectRequest, AdjustScoreRequest, AdminCommand, BanRequest, InboundEvent,
    InboundPayload, ListProjectsQuery, RemoveReviewRequest, SearchQuery,
};

pub use responses::{
    ActionResponse, ActorProfileResponse, AdminReply, AdminStatsResponse, CategoryResponse,
    HistoryResponse, PageResponse, ProjectDetailResponse, ProjectResponse, Reply, StatsResponse,
};
