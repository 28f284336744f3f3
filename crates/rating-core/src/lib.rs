//! # rating-core
//!
//! Domain layer containing entities, value objects, the ledger planner,
//! repository traits, and ledger events.
//! This crate has zero dependencies on infrastructure (database, cache, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod ledger;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Action, ActionKind, ActionPayload, Ban, HistoryKind, HistoryRecord, Project};
pub use error::DomainError;
pub use events::LedgerEvent;
pub use ledger::{LedgerOp, LedgerReceipt, LedgerRequest, MAX_REVIEW_CHARS};
pub use traits::{
    ActionRepository, BanRepository, CategoryCount, CooldownLimiter, CooldownStatus, EventSink,
    HistoryRepository, LedgerStore, ProjectQuery, ProjectRepository, ProjectSort, RepoResult,
};
pub use value_objects::{ActorId, RatingCurve, Snowflake, SnowflakeGenerator, SnowflakeParseError, Stars};
