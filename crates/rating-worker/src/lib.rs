//! # rating-worker
//!
//! Wires the storage, cache and service layers together from `AppConfig`
//! and runs the periodic maintenance tasks.

pub mod bootstrap;
pub mod tasks;

pub use bootstrap::{create_worker_state, WorkerState};
pub use tasks::{spawn_maintenance, MaintenanceHandles};

use rating_common::{AppConfig, AppError};
use tracing::info;

/// Bootstrap, start maintenance, and wait for Ctrl-C
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let state = create_worker_state(config).await?;
    let handles = spawn_maintenance(&state);

    info!("Rating worker running; press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AppError::Config(format!("Failed to listen for shutdown signal: {e}")))?;

    info!("Shutdown signal received");
    handles.shutdown();
    Ok(())
}
