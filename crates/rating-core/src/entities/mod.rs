//! Domain entities

mod action;
mod ban;
mod history;
mod project;

pub use action::{Action, ActionKind, ActionPayload};
pub use ban::Ban;
pub use history::{HistoryKind, HistoryRecord};
pub use project::Project;
