//! # rating-cache
//!
//! Redis-backed cooldowns and pub/sub fan-out for the rating ledger.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Cooldown**: Per-actor mutation cooldown, in Redis or in-process
//! - **Pub/Sub**: Ledger event distribution to audit and per-project channels
//!
//! ## Example
//!
//! ```ignore
//! use rating_cache::{Publisher, RedisCooldown, RedisPool, RedisPoolConfig};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let cooldown = RedisCooldown::new(pool.clone(), Duration::from_secs(60));
//! let publisher = Publisher::new(pool);
//!
//! if cooldown.try_acquire(actor_id).await?.retry_after_secs().is_none() {
//!     publisher.publish(&event).await?;
//! }
//! ```

pub mod cooldown;
pub mod pool;
pub mod pubsub;

pub use cooldown::{LocalCooldown, RedisCooldown, COOLDOWN_KEY_PREFIX};
pub use pool::{
    create_shared_pool, RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool,
};
pub use pubsub::{LedgerChannel, LogSink, Publisher, AUDIT_CHANNEL, PROJECT_CHANNEL_PREFIX};
