//! Repository implementations
//!
//! PostgreSQL implementations of the storage traits defined in rating-core.

mod action;
mod ban;
mod error;
mod history;
mod ledger;
mod project;

pub use action::PgActionRepository;
pub use ban::PgBanRepository;
pub use history::PgHistoryRepository;
pub use ledger::PgLedgerStore;
pub use project::PgProjectRepository;
