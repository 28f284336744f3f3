//! Service context - dependency container for services
//!
//! Holds the storage ports, the access gate, the event sink and the
//! in-process conversation slots.

use std::sync::Arc;
use std::time::Duration;

use rating_core::traits::{
    ActionRepository, BanRepository, CooldownLimiter, EventSink, HistoryRepository, LedgerStore,
    ProjectRepository,
};
use rating_core::{Snowflake, SnowflakeGenerator};
use rating_db::{
    MemoryStore, PgActionRepository, PgBanRepository, PgHistoryRepository, PgLedgerStore, PgPool,
    PgProjectRepository,
};

use super::conversation::ConversationStore;
use super::error::{ServiceError, ServiceResult};
use super::gate::AccessGate;

/// Default total attempts for a mutation that keeps hitting write conflicts
pub const DEFAULT_LEDGER_ATTEMPTS: u32 = 3;

/// Default idle lifetime of a review conversation
pub const DEFAULT_CONVERSATION_TTL: Duration = Duration::from_secs(86_400);

/// Service context containing all dependencies
///
/// Cloning is cheap; every dependency sits behind an `Arc`.
#[derive(Clone)]
pub struct ServiceContext {
    // Storage
    project_repo: Arc<dyn ProjectRepository>,
    action_repo: Arc<dyn ActionRepository>,
    history_repo: Arc<dyn HistoryRepository>,
    ban_repo: Arc<dyn BanRepository>,
    ledger: Arc<dyn LedgerStore>,

    // Gate and fan-out
    gate: AccessGate,
    event_sink: Arc<dyn EventSink>,

    // Conversations
    conversations: Arc<ConversationStore>,

    snowflake_generator: Arc<SnowflakeGenerator>,
    ledger_max_attempts: u32,
}

impl ServiceContext {
    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    /// Get the project repository
    pub fn project_repo(&self) -> &dyn ProjectRepository {
        self.project_repo.as_ref()
    }

    /// Get the action repository
    pub fn action_repo(&self) -> &dyn ActionRepository {
        self.action_repo.as_ref()
    }

    /// Get the history repository
    pub fn history_repo(&self) -> &dyn HistoryRepository {
        self.history_repo.as_ref()
    }

    /// Get the ban repository
    pub fn ban_repo(&self) -> &dyn BanRepository {
        self.ban_repo.as_ref()
    }

    /// Get the ledger store, the only writer of scores
    pub fn ledger(&self) -> &dyn LedgerStore {
        self.ledger.as_ref()
    }

    // === Gate, events, conversations ===

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    pub fn event_sink(&self) -> &dyn EventSink {
        self.event_sink.as_ref()
    }

    pub fn conversations(&self) -> &ConversationStore {
        self.conversations.as_ref()
    }

    // === Settings ===

    pub fn ledger_max_attempts(&self) -> u32 {
        self.ledger_max_attempts
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("conversations", &self.conversations.len())
            .field("ledger_max_attempts", &self.ledger_max_attempts)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    project_repo: Option<Arc<dyn ProjectRepository>>,
    action_repo: Option<Arc<dyn ActionRepository>>,
    history_repo: Option<Arc<dyn HistoryRepository>>,
    ban_repo: Option<Arc<dyn BanRepository>>,
    ledger: Option<Arc<dyn LedgerStore>>,
    cooldown: Option<Arc<dyn CooldownLimiter>>,
    event_sink: Option<Arc<dyn EventSink>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    conversation_ttl: Duration,
    ledger_max_attempts: u32,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            project_repo: None,
            action_repo: None,
            history_repo: None,
            ban_repo: None,
            ledger: None,
            cooldown: None,
            event_sink: None,
            snowflake_generator: None,
            conversation_ttl: DEFAULT_CONVERSATION_TTL,
            ledger_max_attempts: DEFAULT_LEDGER_ATTEMPTS,
        }
    }

    /// Use PostgreSQL for every storage port
    pub fn postgres(self, pool: &PgPool) -> Self {
        self.project_repo(Arc::new(PgProjectRepository::new(pool.clone())))
            .action_repo(Arc::new(PgActionRepository::new(pool.clone())))
            .history_repo(Arc::new(PgHistoryRepository::new(pool.clone())))
            .ban_repo(Arc::new(PgBanRepository::new(pool.clone())))
            .ledger(Arc::new(PgLedgerStore::new(pool.clone())))
    }

    /// Use one in-memory store for every storage port
    pub fn memory(self, store: Arc<MemoryStore>) -> Self {
        self.project_repo(store.clone())
            .action_repo(store.clone())
            .history_repo(store.clone())
            .ban_repo(store.clone())
            .ledger(store)
    }

    pub fn project_repo(mut self, repo: Arc<dyn ProjectRepository>) -> Self {
        self.project_repo = Some(repo);
        self
    }

    pub fn action_repo(mut self, repo: Arc<dyn ActionRepository>) -> Self {
        self.action_repo = Some(repo);
        self
    }

    pub fn history_repo(mut self, repo: Arc<dyn HistoryRepository>) -> Self {
        self.history_repo = Some(repo);
        self
    }

    pub fn ban_repo(mut self, repo: Arc<dyn BanRepository>) -> Self {
        self.ban_repo = Some(repo);
        self
    }

    pub fn ledger(mut self, ledger: Arc<dyn LedgerStore>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn cooldown(mut self, limiter: Arc<dyn CooldownLimiter>) -> Self {
        self.cooldown = Some(limiter);
        self
    }

    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn conversation_ttl(mut self, ttl: Duration) -> Self {
        self.conversation_ttl = ttl;
        self
    }

    pub fn ledger_max_attempts(mut self, attempts: u32) -> Self {
        self.ledger_max_attempts = attempts;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        if self.ledger_max_attempts == 0 {
            return Err(ServiceError::validation("ledger_max_attempts must be at least 1"));
        }

        let ban_repo = self
            .ban_repo
            .ok_or_else(|| ServiceError::validation("ban_repo is required"))?;
        let cooldown = self
            .cooldown
            .ok_or_else(|| ServiceError::validation("cooldown is required"))?;

        Ok(ServiceContext {
            project_repo: self
                .project_repo
                .ok_or_else(|| ServiceError::validation("project_repo is required"))?,
            action_repo: self
                .action_repo
                .ok_or_else(|| ServiceError::validation("action_repo is required"))?,
            history_repo: self
                .history_repo
                .ok_or_else(|| ServiceError::validation("history_repo is required"))?,
            ledger: self
                .ledger
                .ok_or_else(|| ServiceError::validation("ledger is required"))?,
            gate: AccessGate::new(ban_repo.clone(), cooldown),
            ban_repo,
            event_sink: self
                .event_sink
                .ok_or_else(|| ServiceError::validation("event_sink is required"))?,
            conversations: Arc::new(ConversationStore::new(self.conversation_ttl)),
            snowflake_generator: self
                .snowflake_generator
                .ok_or_else(|| ServiceError::validation("snowflake_generator is required"))?,
            ledger_max_attempts: self.ledger_max_attempts,
        })
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
