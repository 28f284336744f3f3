//! Shared fixtures for service unit tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rating_cache::LocalCooldown;
use rating_core::traits::{EventSink, LedgerStore, RepoResult};
use rating_core::{LedgerEvent, Project, SnowflakeGenerator};
use rating_db::MemoryStore;

use super::context::ServiceContext;

/// Keeps every published event
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<LedgerEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn publish(&self, event: &LedgerEvent) -> RepoResult<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

pub fn memory_context() -> (ServiceContext, Arc<MemoryStore>, Arc<RecordingSink>) {
    let store = Arc::new(MemoryStore::new());
    let sink = Arc::new(RecordingSink::default());
    let ctx = ServiceContext::builder()
        .memory(store.clone())
        .cooldown(Arc::new(LocalCooldown::new(Duration::from_secs(60))))
        .event_sink(sink.clone())
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(1)))
        .build()
        .unwrap();
    (ctx, store, sink)
}

/// Memory-backed context whose ledger is replaced
pub fn context_with_ledger(ledger: Arc<dyn LedgerStore>, attempts: u32) -> ServiceContext {
    ServiceContext::builder()
        .memory(Arc::new(MemoryStore::new()))
        .ledger(ledger)
        .cooldown(Arc::new(LocalCooldown::new(Duration::from_secs(60))))
        .event_sink(Arc::new(RecordingSink::default()))
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(1)))
        .ledger_max_attempts(attempts)
        .build()
        .unwrap()
}

pub async fn seed_project(ctx: &ServiceContext, name: &str) -> Project {
    let project = Project::new(ctx.generate_id(), name.to_string(), "tools".to_string());
    ctx.project_repo().create(&project).await.unwrap();
    project
}
