//! Test helpers for integration tests
//!
//! Provides a dispatcher harness over either backend, plus reply
//! assertions shared by the scenario tests.

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use rating_cache::{LocalCooldown, LogSink};
use rating_core::traits::EventSink;
use rating_core::{LedgerReceipt, Snowflake, SnowflakeGenerator};
use rating_db::{create_pool, run_migrations, MemoryStore, PgPool, PoolConfig};
use rating_service::dto::{Actor, AdminReply, InboundEvent, InboundPayload, Reply};
use rating_service::services::ServiceContextBuilder;
use rating_service::{Dispatcher, ServiceContext};

/// Snowflake worker ids handed to harnesses, so parallel tests never collide
static WORKER_COUNTER: AtomicU16 = AtomicU16::new(1);

fn next_worker_id() -> u16 {
    WORKER_COUNTER.fetch_add(1, Ordering::SeqCst) % 1024
}

/// Harness settings
#[derive(Debug, Clone, Copy)]
pub struct HarnessConfig {
    pub cooldown: Duration,
    pub conversation_ttl: Duration,
    pub ledger_max_attempts: u32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(60),
            conversation_ttl: Duration::from_secs(86_400),
            ledger_max_attempts: 3,
        }
    }
}

/// Dispatcher wired to a test backend
pub struct TestHarness {
    pub dispatcher: Dispatcher,
    pub cooldown: Arc<LocalCooldown>,
}

impl TestHarness {
    /// In-memory harness with default settings
    pub fn memory() -> Self {
        Self::memory_with(HarnessConfig::default())
    }

    pub fn memory_with(config: HarnessConfig) -> Self {
        Self::build(
            ServiceContext::builder().memory(Arc::new(MemoryStore::new())),
            config,
            Arc::new(LogSink),
        )
        .expect("memory harness")
    }

    /// PostgreSQL harness, `None` when DATABASE_URL is unset
    pub async fn postgres() -> Option<Self> {
        let pool = test_pool().await?;
        Self::build(
            ServiceContext::builder().postgres(&pool),
            HarnessConfig::default(),
            Arc::new(LogSink),
        )
        .ok()
    }

    pub fn build(
        builder: ServiceContextBuilder,
        config: HarnessConfig,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self> {
        let cooldown = Arc::new(LocalCooldown::new(config.cooldown));
        let context = builder
            .cooldown(cooldown.clone())
            .event_sink(sink)
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(next_worker_id())))
            .conversation_ttl(config.conversation_ttl)
            .ledger_max_attempts(config.ledger_max_attempts)
            .build()
            .map_err(|e| anyhow::anyhow!("{e}"))?;

        Ok(Self {
            dispatcher: Dispatcher::new(context),
            cooldown,
        })
    }

    pub fn context(&self) -> &ServiceContext {
        self.dispatcher.context()
    }

    /// Dispatch one event on conversation 1
    pub async fn send(&self, actor: Actor, payload: InboundPayload) -> Reply {
        self.dispatcher
            .dispatch(InboundEvent::new(actor, 1, payload))
            .await
    }

    /// Dispatch an event given as transport JSON
    pub async fn send_json(&self, raw: &str) -> Result<Reply> {
        let event: InboundEvent = serde_json::from_str(raw).context("invalid inbound event")?;
        Ok(self.dispatcher.dispatch(event).await)
    }

    /// Add a project through the admin command and return its id
    pub async fn add_project(&self, admin: Actor, name: &str) -> Result<Snowflake> {
        match self.send(admin, crate::fixtures::add_project(name, "tools")).await {
            Reply::Admin {
                reply: AdminReply::ProjectAdded { project },
            } => Ok(project.id),
            other => bail!("project not added: {other:?}"),
        }
    }

    /// Full review conversation; returns the committed receipt
    pub async fn review(&self, actor: Actor, project: Snowflake, body: &str, value: &str) -> Result<LedgerReceipt> {
        use crate::fixtures::{stars, start_review, text};

        expect_no_error(&self.send(actor, start_review(project)).await)?;
        expect_no_error(&self.send(actor, text(body)).await)?;
        match self.send(actor, stars(value)).await {
            Reply::ReviewCommitted { receipt } => Ok(receipt),
            other => bail!("review not committed: {other:?}"),
        }
    }

    /// Stored aggregate score
    pub async fn score(&self, project: Snowflake) -> Result<i64> {
        let project = self
            .context()
            .project_repo()
            .find_by_id(project)
            .await?
            .context("project missing")?;
        Ok(project.score)
    }

    /// Score recomputed from the surviving contributions
    pub async fn derived_score(&self, project: Snowflake) -> Result<i64> {
        Ok(self.context().ledger().derived_score(project).await?)
    }
}

/// Migrated pool for PostgreSQL scenarios
pub async fn test_pool() -> Option<PgPool> {
    if !check_test_env() {
        return None;
    }
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = create_pool(&PoolConfig {
        url,
        ..PoolConfig::default()
    })
    .await
    .ok()?;
    run_migrations(
        &pool,
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../crates/rating-db/migrations"),
    )
    .await
    .ok()?;
    Some(pool)
}

/// Check if the PostgreSQL test environment is configured
pub fn check_test_env() -> bool {
    let _ = dotenvy::dotenv();

    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }

    true
}

/// Fail when the reply reports an error
pub fn expect_no_error(reply: &Reply) -> Result<()> {
    match reply.error_code() {
        Some(code) => bail!("unexpected error reply {code}: {reply:?}"),
        None => Ok(()),
    }
}

/// Assert the reply is an error with the given code
pub fn assert_error_code(reply: &Reply, expected: &str) {
    assert_eq!(
        reply.error_code(),
        Some(expected),
        "expected error {expected}, got {reply:?}"
    );
}
