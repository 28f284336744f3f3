//! Redis Pub/Sub module.
//!
//! Fans committed ledger events out to Redis channels.

mod channels;
mod publisher;

pub use channels::{LedgerChannel, AUDIT_CHANNEL, PROJECT_CHANNEL_PREFIX};
pub use publisher::{LogSink, Publisher};
