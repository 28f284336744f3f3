use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::Clock;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use rating_core::traits::{CooldownLimiter, CooldownStatus, RepoResult};
use rating_core::ActorId;

/// In-process cooldown backed by a keyed `governor` limiter
///
/// One cell per window with a burst of one: the first attempt passes and
/// the next is allowed once the full window has elapsed. Rejected attempts
/// do not consume a cell.
pub struct LocalCooldown {
    limiter: Option<DefaultKeyedRateLimiter<ActorId>>,
}

impl LocalCooldown {
    /// A zero window disables the cooldown
    #[must_use]
    pub fn new(window: Duration) -> Self {
        let limiter = Quota::with_period(window)
            .map(|quota| RateLimiter::keyed(quota.allow_burst(NonZeroU32::MIN)));
        Self { limiter }
    }

    /// Drop state for actors whose window has fully elapsed
    pub fn retain_recent(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.retain_recent();
        }
    }

    /// Number of actors currently tracked
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.limiter.as_ref().map_or(0, |limiter| limiter.len())
    }
}

#[async_trait]
impl CooldownLimiter for LocalCooldown {
    async fn try_acquire(&self, actor_id: ActorId) -> RepoResult<CooldownStatus> {
        let Some(limiter) = &self.limiter else {
            return Ok(CooldownStatus::Ready);
        };

        Ok(match limiter.check_key(&actor_id) {
            Ok(()) => CooldownStatus::Ready,
            Err(not_until) => CooldownStatus::CoolingDown {
                retry_after: not_until.wait_time_from(limiter.clock().now()),
            },
        })
    }
}
