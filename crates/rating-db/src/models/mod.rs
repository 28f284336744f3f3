//! Database models - SQLx-compatible structs for PostgreSQL tables

mod action;
mod ban;
mod history;
mod project;

pub use action::ActionModel;
pub use ban::BanModel;
pub use history::HistoryModel;
pub use project::{CategoryCountModel, ProjectModel};
