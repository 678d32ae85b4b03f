// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message aggregation and dispatch engine for bridgebot.
//!
//! The [`Engine`] is the central coordinator that:
//! - Receives message and typing events from the channel adapter
//! - Filters and caches pending context via the [`MessageCollector`]
//! - Runs the [`InactivityMonitor`] as a cancellable periodic task
//! - Dispatches batched context to the persona service through the
//!   mutually exclusive [`DispatchCoordinator`]
//! - Handles graceful shutdown

pub mod activity;
pub mod collector;
pub mod connectivity;
pub mod dispatch;
pub mod monitor;
pub mod profile;
pub mod scrub;
pub mod shutdown;

use std::sync::Arc;

use bridgebot_cache::CacheStore;
use bridgebot_config::model::BridgeConfig;
use bridgebot_core::{BridgeError, ChannelAdapter, ChannelId, ChatEvent, PersonaAdapter, UserId};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub use crate::activity::ActivityState;
pub use crate::collector::{CollectorSettings, MessageCollector};
pub use crate::connectivity::{ConnectivityProbe, TcpProbe};
pub use crate::dispatch::{DispatchCoordinator, DispatchOutcome, DispatchSettings};
pub use crate::monitor::{should_dispatch, InactivityMonitor, MonitorSettings};
pub use crate::profile::ProfileSync;
pub use crate::scrub::{strip_emoji, Scrubber};

/// The assembled aggregation/dispatch engine.
///
/// Wires collector, monitor, and coordinator around one shared
/// [`ActivityState`] and one [`CacheStore`].
pub struct Engine {
    channel: Arc<dyn ChannelAdapter>,
    collector: MessageCollector,
    coordinator: Arc<DispatchCoordinator>,
    monitor: Arc<InactivityMonitor>,
}

impl Engine {
    /// Builds the engine from configuration and connected adapters.
    ///
    /// The first watched channel doubles as the reply destination.
    pub fn new(
        channel: Arc<dyn ChannelAdapter>,
        persona: Arc<dyn PersonaAdapter>,
        store: Arc<CacheStore>,
        config: &BridgeConfig,
        bot_id: UserId,
    ) -> Result<Self, BridgeError> {
        let watch_channels: Vec<ChannelId> = config
            .discord
            .watch_channels
            .iter()
            .copied()
            .map(ChannelId)
            .collect();
        let reply_channel = *watch_channels.first().ok_or_else(|| {
            BridgeError::Config("discord.watch_channels must not be empty".into())
        })?;

        let activity = Arc::new(ActivityState::new());
        let user_scrubber = Scrubber::compile(&config.formatting.strip_user_patterns)?;
        let persona_scrubber = Scrubber::compile(&config.formatting.strip_persona_patterns)?;
        let probe: Arc<dyn ConnectivityProbe> =
            Arc::new(TcpProbe::new(config.runtime.probe_addr.clone()));

        let collector = MessageCollector::new(
            channel.clone(),
            store.clone(),
            activity.clone(),
            user_scrubber,
            CollectorSettings {
                watch_channels,
                bot_id,
                comment_prefixes: config.formatting.comment_prefixes.clone(),
                strip_user_emojis: config.formatting.strip_user_emojis,
            },
        );

        let coordinator = Arc::new(DispatchCoordinator::new(
            channel.clone(),
            persona,
            store.clone(),
            activity.clone(),
            probe,
            persona_scrubber,
            DispatchSettings {
                reply_channel,
                line_by_line: config.formatting.line_by_line,
                strip_persona_emojis: config.formatting.strip_persona_emojis,
            },
        ));

        let monitor = Arc::new(InactivityMonitor::new(
            store,
            activity,
            coordinator.clone(),
            MonitorSettings::from(&config.batching),
        ));

        Ok(Self {
            channel,
            collector,
            coordinator,
            monitor,
        })
    }

    /// The dispatch coordinator, for externally triggered dispatch requests.
    pub fn coordinator(&self) -> Arc<DispatchCoordinator> {
        self.coordinator.clone()
    }

    /// Runs the engine until the cancellation token fires.
    ///
    /// The inactivity monitor runs as its own task bound to the same token;
    /// the engine loop multiplexes channel events onto the collector.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), BridgeError> {
        info!("engine running");

        let monitor = self.monitor.clone();
        let monitor_cancel = cancel.clone();
        let monitor_task = tokio::spawn(async move { monitor.run(monitor_cancel).await });

        loop {
            tokio::select! {
                event = self.channel.next_event() => match event {
                    Ok(ChatEvent::Message(message)) => {
                        if let Err(e) = self.collector.accept(message).await {
                            error!(error = %e, "failed to process inbound message");
                        }
                    }
                    Ok(ChatEvent::Typing(typing)) => {
                        self.collector.on_typing(typing).await;
                    }
                    Err(e) => {
                        error!(error = %e, "channel event error");
                        if e.to_string().contains("closed") {
                            break;
                        }
                    }
                },
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping engine");
                    break;
                }
            }
        }

        let _ = monitor_task.await;
        self.channel.shutdown().await?;

        info!("engine stopped");
        Ok(())
    }
}
