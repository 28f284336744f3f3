//! # rating-db
//!
//! Storage layer for the rating ledger.
//!
//! - PostgreSQL pool management and runtime migrations
//! - SQLx `FromRow` models and entity mappers
//! - `Pg*` repositories and [`PgLedgerStore`], the single-transaction ledger writer
//! - [`MemoryStore`], an in-process backend implementing the same traits
//!
//! ```rust,ignore
//! use rating_db::{create_pool, run_migrations, PgLedgerStore, PoolConfig};
//!
//! let pool = create_pool(&PoolConfig::default()).await?;
//! run_migrations(&pool, "./crates/rating-db/migrations").await?;
//! let ledger = PgLedgerStore::new(pool);
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryStore;
pub use pool::{create_pool, run_migrations, PgPool, PoolConfig};
pub use repositories::{
    PgActionRepository, PgBanRepository, PgHistoryRepository, PgLedgerStore, PgProjectRepository,
};
