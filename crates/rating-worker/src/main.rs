//! Rating worker entry point
//!
//! Run with:
//! ```bash
//! cargo run -p rating-worker
//! ```
//!
//! Configuration is loaded from environment variables.

use rating_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Tracing first so configuration errors are logged; the preset follows APP_ENV
    let env = std::env::var("APP_ENV")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default();
    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Worker failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting rating worker...");

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        cooldown_backend = ?config.gate.backend,
        redis = config.redis.is_some(),
        "Configuration loaded"
    );

    rating_worker::run(config).await?;

    Ok(())
}
