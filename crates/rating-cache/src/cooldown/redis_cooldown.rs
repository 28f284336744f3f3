use std::time::Duration;

use async_trait::async_trait;
use rating_core::traits::{CooldownLimiter, CooldownStatus, RepoResult};
use rating_core::ActorId;
use tracing::instrument;

use crate::pool::RedisPool;

/// Key prefix for cooldown markers
pub const COOLDOWN_KEY_PREFIX: &str = "cooldown:";

/// Cooldown stored as a self-expiring Redis key
///
/// An accepted attempt creates `cooldown:{actor}` with `SET NX EX`; while the
/// key lives every further attempt is rejected and leaves it untouched.
#[derive(Clone)]
pub struct RedisCooldown {
    pool: RedisPool,
    window: Duration,
}

impl RedisCooldown {
    #[must_use]
    pub fn new(pool: RedisPool, window: Duration) -> Self {
        Self { pool, window }
    }

    fn key(actor_id: ActorId) -> String {
        format!("{COOLDOWN_KEY_PREFIX}{actor_id}")
    }
}

#[async_trait]
impl CooldownLimiter for RedisCooldown {
    #[instrument(skip(self))]
    async fn try_acquire(&self, actor_id: ActorId) -> RepoResult<CooldownStatus> {
        if self.window.is_zero() {
            return Ok(CooldownStatus::Ready);
        }

        let key = Self::key(actor_id);
        let now = chrono::Utc::now().timestamp().to_string();
        if self.pool.set_nx_ex(&key, &now, self.window.as_secs()).await? {
            return Ok(CooldownStatus::Ready);
        }

        // The key may expire between SET and PTTL; the caller still waits a second
        let retry_after = self.pool.pttl(&key).await?.unwrap_or(Duration::ZERO);
        Ok(CooldownStatus::CoolingDown { retry_after })
    }
}
