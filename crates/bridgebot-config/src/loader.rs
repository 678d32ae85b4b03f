// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./bridgebot.toml` > `~/.config/bridgebot/bridgebot.toml`
//! > `/etc/bridgebot/bridgebot.toml` with environment variable overrides via
//! `BRIDGEBOT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::BridgeConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/bridgebot/bridgebot.toml` (system-wide)
/// 3. `~/.config/bridgebot/bridgebot.toml` (user XDG config)
/// 4. `./bridgebot.toml` (local directory)
/// 5. `BRIDGEBOT_*` environment variables
pub fn load_config() -> Result<BridgeConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<BridgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BridgeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BridgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BridgeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(BridgeConfig::default()))
        .merge(Toml::file("/etc/bridgebot/bridgebot.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("bridgebot/bridgebot.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("bridgebot.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. `BRIDGEBOT_DISCORD_WATCH_CHANNELS` must
/// map to `discord.watch_channels`, not `discord.watch.channels`.
fn env_provider() -> Env {
    Env::prefixed("BRIDGEBOT_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: BRIDGEBOT_DISCORD_TOKEN -> "discord_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("discord_", "discord.", 1)
            .replacen("persona_", "persona.", 1)
            .replacen("cache_", "cache.", 1)
            .replacen("batching_", "batching.", 1)
            .replacen("formatting_", "formatting.", 1)
            .replacen("runtime_", "runtime.", 1);
        mapped.into()
    })
}
