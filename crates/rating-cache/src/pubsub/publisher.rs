//! Redis Pub/Sub publisher.
//!
//! Publishes committed ledger events for audit consumers and per-project
//! subscribers.

use async_trait::async_trait;
use rating_core::traits::{EventSink, RepoResult};
use rating_core::LedgerEvent;
use redis::AsyncCommands;

use crate::pool::{RedisPool, RedisResult};
use crate::pubsub::LedgerChannel;

/// Redis Pub/Sub publisher
#[derive(Clone)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    /// Create a new publisher
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish a raw payload to one channel
    pub async fn publish_raw(&self, channel: &LedgerChannel, message: &str) -> RedisResult<u32> {
        let mut conn = self.pool.get().await?;
        let channel_name = channel.name();

        let receivers: u32 = conn.publish(&channel_name, message).await?;

        tracing::debug!(
            channel = %channel_name,
            receivers = receivers,
            "Published raw message"
        );

        Ok(receivers)
    }

    /// Publish an event to every channel it fans out to
    pub async fn publish_event(&self, event: &LedgerEvent) -> RedisResult<u32> {
        let payload = serde_json::to_string(event)?;
        let channels = LedgerChannel::targets(event);
        let mut total_receivers = 0;
        let mut conn = self.pool.get().await?;

        for channel in &channels {
            let receivers: u32 = conn.publish(channel.name(), &payload).await?;
            total_receivers += receivers;
        }

        tracing::debug!(
            channels = channels.len(),
            event_type = %event.event_type(),
            total_receivers = total_receivers,
            "Published ledger event"
        );

        Ok(total_receivers)
    }
}

#[async_trait]
impl EventSink for Publisher {
    async fn publish(&self, event: &LedgerEvent) -> RepoResult<()> {
        self.publish_event(event).await?;
        Ok(())
    }
}

/// Sink used when no Redis is configured: events only reach the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl EventSink for LogSink {
    async fn publish(&self, event: &LedgerEvent) -> RepoResult<()> {
        tracing::info!(
            event_type = %event.event_type(),
            project_id = ?event.project_id(),
            "Ledger event"
        );
        Ok(())
    }
}
