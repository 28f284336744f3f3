//! Per-actor mutation cooldowns.
//!
//! Two [`CooldownLimiter`](rating_core::traits::CooldownLimiter) backends:
//! a Redis key per actor shared by every process, and an in-process keyed
//! GCRA limiter for single-instance deployments and tests.

mod local;
mod redis_cooldown;

pub use local::LocalCooldown;
pub use redis_cooldown::{RedisCooldown, COOLDOWN_KEY_PREFIX};
