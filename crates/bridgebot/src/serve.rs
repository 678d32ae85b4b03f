// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `bridgebot serve` command implementation.
//!
//! Opens the cache store, connects the Discord channel and persona service
//! adapters, runs a startup profile sync, and enters the engine loop.
//! Supports graceful shutdown via signal handlers.

use std::sync::Arc;

use bridgebot_cache::CacheStore;
use bridgebot_config::BridgeConfig;
use bridgebot_core::{Adapter, BridgeError, ChannelAdapter, HealthStatus, PersonaAdapter};
use bridgebot_discord::DiscordChannel;
use bridgebot_engine::{shutdown, Engine, ProfileSync};
use bridgebot_persona::PersonaService;
use tracing::{error, info, warn};

/// Runs the `bridgebot serve` command.
pub async fn run_serve(config: BridgeConfig) -> Result<(), BridgeError> {
    init_tracing(&config.runtime.log_level);

    info!("starting bridgebot serve");

    // Open (or bootstrap) the pending-context cache.
    let store = Arc::new(CacheStore::open(&config.cache.path).await?);
    info!(
        path = %config.cache.path,
        pending = store.len().await,
        "cache store ready"
    );

    // Initialize the persona service adapter.
    let persona: Arc<dyn PersonaAdapter> = {
        let service = PersonaService::new(&config.persona, &config.formatting).map_err(|e| {
            error!(error = %e, "failed to initialize persona adapter");
            eprintln!(
                "error: persona credentials required. Set persona.token and \
                 persona.character_id via config or BRIDGEBOT_PERSONA_* env vars."
            );
            e
        })?;
        Arc::new(service)
    };

    match persona.health_check().await {
        Ok(HealthStatus::Healthy) => info!("persona service reachable"),
        Ok(HealthStatus::Degraded(reason)) | Ok(HealthStatus::Unhealthy(reason)) => {
            warn!(reason = %reason, "persona service not healthy, continuing anyway");
        }
        Err(e) => warn!(error = %e, "persona health check failed, continuing anyway"),
    }

    // Connect the Discord channel.
    let channel: Arc<dyn ChannelAdapter> = {
        let mut discord = DiscordChannel::new(&config.discord).map_err(|e| {
            error!(error = %e, "failed to initialize Discord channel");
            eprintln!(
                "error: Discord bot token required. Set discord.token via config \
                 or BRIDGEBOT_DISCORD_TOKEN."
            );
            e
        })?;
        discord.connect().await?;
        Arc::new(discord)
    };

    let bot_id = channel
        .bot_user_id()
        .ok_or_else(|| BridgeError::Internal("bot user id unavailable after connect".into()))?;

    // One-shot identity sync with the persona character (off the hot path).
    ProfileSync::new(channel.clone(), persona.clone(), &config.discord)
        .sync()
        .await;

    // Assemble and run the engine until a shutdown signal arrives.
    let engine = Engine::new(channel, persona, store, &config, bot_id)?;
    let cancel = shutdown::install_signal_handler();
    engine.run(cancel).await
}

/// Initializes the tracing subscriber from the configured log level,
/// honoring an explicit `RUST_LOG`-style env filter when present.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bridgebot={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
