// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The inactivity monitor.
//!
//! A cancellable periodic task that evaluates the debounce-or-batch trigger
//! each tick and invokes the dispatch coordinator when conditions are met:
//! at least one pending entry, and either the idle threshold elapsed or the
//! batch threshold reached. A failing tick is logged and the loop
//! continues; the monitor never terminates because of a single cycle's
//! failure.

use std::sync::Arc;
use std::time::Duration;

use bridgebot_cache::CacheStore;
use bridgebot_config::model::BatchingConfig;
use bridgebot_core::BridgeError;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::activity::ActivityState;
use crate::dispatch::DispatchCoordinator;

/// Trigger thresholds and poll cadence.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub poll_interval: Duration,
    pub idle_threshold: Duration,
    pub batch_threshold: usize,
}

impl From<&BatchingConfig> for MonitorSettings {
    fn from(config: &BatchingConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            idle_threshold: Duration::from_secs(config.idle_threshold_secs),
            batch_threshold: config.batch_threshold,
        }
    }
}

/// The debounce-or-batch trigger rule.
///
/// Dispatch fires at the earlier of "quiet period elapsed" or "backlog
/// full", and never on an empty cache.
pub fn should_dispatch(pending: usize, idle: Duration, settings: &MonitorSettings) -> bool {
    pending >= 1 && (idle >= settings.idle_threshold || pending >= settings.batch_threshold)
}

/// Periodic scheduler that drives the dispatch coordinator.
pub struct InactivityMonitor {
    store: Arc<CacheStore>,
    activity: Arc<ActivityState>,
    coordinator: Arc<DispatchCoordinator>,
    settings: MonitorSettings,
}

impl InactivityMonitor {
    pub fn new(
        store: Arc<CacheStore>,
        activity: Arc<ActivityState>,
        coordinator: Arc<DispatchCoordinator>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            store,
            activity,
            coordinator,
            settings,
        }
    }

    /// Runs until the cancellation token fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.settings.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            poll_secs = self.settings.poll_interval.as_secs(),
            idle_secs = self.settings.idle_threshold.as_secs(),
            batch = self.settings.batch_threshold,
            "inactivity monitor running"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("inactivity monitor stopped");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.tick().await {
                        warn!(error = %e, "monitor tick failed, continuing");
                    }
                }
            }
        }
    }

    /// Evaluates one tick; dispatches when the trigger rule is met.
    pub async fn tick(&self) -> Result<(), BridgeError> {
        if self.activity.awaiting_response() {
            return Ok(());
        }

        let pending = self.store.len().await;
        let idle = self.activity.idle_for().await;

        if should_dispatch(pending, idle, &self.settings) {
            debug!(
                pending,
                idle_secs = idle.as_secs(),
                "dispatch conditions met"
            );
            let outcome = self.coordinator.dispatch().await?;
            debug!(?outcome, "dispatch finished");
        }

        Ok(())
    }
}
