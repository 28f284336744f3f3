//! Entity to model mappers
//!
//! - `From<Model> for Entity` / `TryFrom<Model> for Entity`: database rows to domain objects
//! - `*Insert` structs: entity data prepared for binding

mod action;
mod ban;
mod history;
mod project;

pub use action::{actions_from_models, ActionInsert};
