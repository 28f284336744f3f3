//! Application configuration structs
//!
//! Loads configuration from environment variables (after reading `.env`).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    /// Absent when neither the cooldown nor event fan-out uses Redis
    pub redis: Option<RedisConfig>,
    pub ledger: LedgerConfig,
    pub gate: GateConfig,
    pub conversation: ConversationConfig,
    pub retention: RetentionConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(()),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Directory holding the SQL migrations applied at startup
    pub migrations_dir: String,
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Ledger engine settings
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Total attempts for a mutation that hits a write conflict
    pub max_attempts: u32,
}

/// Where cooldown timestamps live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CooldownBackend {
    /// Shared across processes via `SET NX EX`
    #[default]
    Redis,
    /// In-process keyed limiter
    Local,
}

impl FromStr for CooldownBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "local" => Ok(Self::Local),
            _ => Err(()),
        }
    }
}

/// Access gate settings
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub cooldown_secs: u64,
    pub backend: CooldownBackend,
}

impl GateConfig {
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

/// Review conversation settings
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    pub idle_ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

impl ConversationConfig {
    #[must_use]
    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.idle_ttl_secs)
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// History retention settings
#[derive(Debug, Clone)]
pub struct RetentionConfig {
    /// Archive history older than this many days; `None` keeps everything
    pub archive_after_days: Option<u32>,
    pub sweep_interval_secs: u64,
}

impl RetentionConfig {
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone)]
pub struct SnowflakeConfig {
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "rating-ledger".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_migrations_dir() -> String {
    "./crates/rating-db/migrations".to_string()
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_cooldown_secs() -> u64 {
    60
}

fn default_idle_ttl_secs() -> u64 {
    86_400 // 24 hours
}

fn default_conversation_sweep_secs() -> u64 {
    300
}

fn default_retention_sweep_secs() -> u64 {
    3_600
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);

        let backend = vars
            .parse::<CooldownBackend>("COOLDOWN_BACKEND")?
            .unwrap_or_default();

        let redis = match lookup("REDIS_URL") {
            Some(url) => Some(RedisConfig {
                url,
                max_connections: vars
                    .parse("REDIS_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_redis_max_connections),
            }),
            None if backend == CooldownBackend::Redis => {
                return Err(ConfigError::MissingVar("REDIS_URL"))
            }
            None => None,
        };

        let max_attempts = vars
            .parse("LEDGER_MAX_ATTEMPTS")?
            .unwrap_or_else(default_max_attempts);
        if max_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "LEDGER_MAX_ATTEMPTS",
                "must be at least 1".to_string(),
            ));
        }

        let worker_id: u16 = vars.parse("WORKER_ID")?.unwrap_or(0);
        if worker_id >= 1024 {
            return Err(ConfigError::InvalidValue(
                "WORKER_ID",
                worker_id.to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").ok_or(ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: vars
                    .parse("DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_max_connections),
                min_connections: vars
                    .parse("DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or_else(default_min_connections),
                migrations_dir: lookup("MIGRATIONS_DIR").unwrap_or_else(default_migrations_dir),
            },
            redis,
            ledger: LedgerConfig { max_attempts },
            gate: GateConfig {
                cooldown_secs: vars
                    .parse("COOLDOWN_SECS")?
                    .unwrap_or_else(default_cooldown_secs),
                backend,
            },
            conversation: ConversationConfig {
                idle_ttl_secs: vars
                    .parse("CONVERSATION_IDLE_TTL_SECS")?
                    .unwrap_or_else(default_idle_ttl_secs),
                sweep_interval_secs: vars
                    .parse("CONVERSATION_SWEEP_INTERVAL_SECS")?
                    .unwrap_or_else(default_conversation_sweep_secs),
            },
            retention: RetentionConfig {
                archive_after_days: vars
                    .parse::<u32>("HISTORY_RETENTION_DAYS")?
                    .filter(|days| *days > 0),
                sweep_interval_secs: vars
                    .parse("RETENTION_SWEEP_INTERVAL_SECS")?
                    .unwrap_or_else(default_retention_sweep_secs),
            },
            snowflake: SnowflakeConfig { worker_id },
        })
    }
}

struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Unset is `None`; set but unparsable is an error
    fn parse<T: FromStr>(&self, key: &'static str) -> Result<Option<T>, ConfigError> {
        match (self.0)(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidValue(key, raw)),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
