//! Periodic maintenance
//!
//! - conversation sweep: drops review conversations idle past their lifetime
//! - cooldown pruning: forgets local cooldown entries whose window elapsed
//! - retention: archives history older than the configured window

use std::sync::Arc;
use std::time::Duration;

use rating_cache::LocalCooldown;
use rating_service::services::{RetentionPolicy, RetentionService};
use rating_service::Dispatcher;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::bootstrap::WorkerState;

/// Running maintenance tasks
pub struct MaintenanceHandles {
    handles: Vec<JoinHandle<()>>,
}

impl MaintenanceHandles {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Abort every task
    pub fn shutdown(self) {
        for handle in self.handles {
            handle.abort();
        }
    }
}

/// Spawn every maintenance task the configuration enables
pub fn spawn_maintenance(state: &WorkerState) -> MaintenanceHandles {
    let mut handles = Vec::new();

    handles.push(spawn_conversation_sweep(
        state.dispatcher.clone(),
        state.config.conversation.sweep_interval(),
    ));

    if let Some(local) = &state.local_cooldown {
        handles.push(spawn_cooldown_prune(
            local.clone(),
            state.config.gate.cooldown().max(Duration::from_secs(1)),
        ));
    }

    if state.retention != RetentionPolicy::KeepForever {
        handles.push(spawn_retention(
            state.dispatcher.clone(),
            state.retention,
            state.config.retention.sweep_interval(),
        ));
    } else {
        info!("History retention disabled");
    }

    info!(tasks = handles.len(), "Maintenance tasks started");
    MaintenanceHandles { handles }
}

fn ticker(period: Duration) -> tokio::time::Interval {
    let mut ticker = interval(period.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

pub fn spawn_conversation_sweep(dispatcher: Dispatcher, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = ticker(period);
        loop {
            ticker.tick().await;
            let removed = dispatcher.sweep_conversations();
            if removed > 0 {
                debug!(removed, "Swept idle conversations");
            }
        }
    })
}

pub fn spawn_cooldown_prune(cooldown: Arc<LocalCooldown>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = ticker(period);
        loop {
            ticker.tick().await;
            cooldown.retain_recent();
            debug!(tracked = cooldown.tracked(), "Pruned local cooldowns");
        }
    })
}

pub fn spawn_retention(
    dispatcher: Dispatcher,
    policy: RetentionPolicy,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = ticker(period);
        loop {
            ticker.tick().await;
            if let Err(e) = RetentionService::new(dispatcher.context(), policy).run_once().await {
                error!(error = %e, "Retention sweep failed");
            }
        }
    })
}
