//! Dependency wiring
//!
//! PostgreSQL and migrations are required. Redis is optional: without it
//! the cooldown must be local and events only go to the log.

use std::sync::Arc;

use rating_cache::{LocalCooldown, LogSink, Publisher, RedisCooldown, RedisPool};
use rating_common::{AppConfig, AppError, CooldownBackend};
use rating_core::traits::{CooldownLimiter, EventSink};
use rating_core::SnowflakeGenerator;
use rating_db::{create_pool, run_migrations, PoolConfig};
use rating_service::services::RetentionPolicy;
use rating_service::{Dispatcher, ServiceContext};
use tracing::info;

/// Everything the worker keeps alive
#[derive(Clone)]
pub struct WorkerState {
    pub dispatcher: Dispatcher,
    /// Present when the cooldown runs in-process and needs pruning
    pub local_cooldown: Option<Arc<LocalCooldown>>,
    pub retention: RetentionPolicy,
    pub config: AppConfig,
}

/// Initialize all dependencies and create `WorkerState`
pub async fn create_worker_state(config: AppConfig) -> Result<WorkerState, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&PoolConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    run_migrations(&pool, &config.database.migrations_dir)
        .await
        .map_err(|e| AppError::Database(format!("Migrations failed: {e}")))?;
    info!("PostgreSQL connection established");

    let redis = match &config.redis {
        Some(redis_config) => {
            info!("Connecting to Redis...");
            let redis = RedisPool::from_config(redis_config)
                .map_err(|e| AppError::Cache(e.to_string()))?;
            redis
                .health_check()
                .await
                .map_err(|e| AppError::Cache(e.to_string()))?;
            info!("Redis connection established");
            Some(redis)
        }
        None => None,
    };

    let (cooldown, local_cooldown) = cooldown_backend(&config, redis.as_ref())?;

    let event_sink: Arc<dyn EventSink> = match &redis {
        Some(redis) => Arc::new(Publisher::new(redis.clone())),
        None => Arc::new(LogSink),
    };

    let context = ServiceContext::builder()
        .postgres(&pool)
        .cooldown(cooldown)
        .event_sink(event_sink)
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .conversation_ttl(config.conversation.idle_ttl())
        .ledger_max_attempts(config.ledger.max_attempts)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(WorkerState {
        dispatcher: Dispatcher::new(context),
        local_cooldown,
        retention: RetentionPolicy::from(&config.retention),
        config,
    })
}

type CooldownChoice = (Arc<dyn CooldownLimiter>, Option<Arc<LocalCooldown>>);

fn cooldown_backend(config: &AppConfig, redis: Option<&RedisPool>) -> Result<CooldownChoice, AppError> {
    let window = config.gate.cooldown();
    match (config.gate.backend, redis) {
        (CooldownBackend::Redis, Some(redis)) => {
            info!(window_secs = window.as_secs(), "Using Redis cooldown");
            Ok((Arc::new(RedisCooldown::new(redis.clone(), window)), None))
        }
        (CooldownBackend::Redis, None) => Err(AppError::Config(
            "COOLDOWN_BACKEND=redis requires REDIS_URL".to_string(),
        )),
        (CooldownBackend::Local, _) => {
            info!(window_secs = window.as_secs(), "Using in-process cooldown");
            let local = Arc::new(LocalCooldown::new(window));
            Ok((local.clone(), Some(local)))
        }
    }
}
