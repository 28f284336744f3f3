//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, ConversationConfig, CooldownBackend, DatabaseConfig,
    Environment, GateConfig, LedgerConfig, RedisConfig, RetentionConfig, SnowflakeConfig,
};
