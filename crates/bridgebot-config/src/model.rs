// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for bridgebot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level bridgebot configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Chat platform (Discord) connection settings.
    #[serde(default)]
    pub discord: DiscordConfig,

    /// AI persona service settings.
    #[serde(default)]
    pub persona: PersonaConfig,

    /// Pending-context cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Debounce/batch dispatch scheduling settings.
    #[serde(default)]
    pub batching: BatchingConfig,

    /// Message and reply text shaping settings.
    #[serde(default)]
    pub formatting: FormattingConfig,

    /// Process-level runtime settings.
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// Chat platform connection configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiscordConfig {
    /// Bot token. `None` means the platform connection cannot start.
    #[serde(default)]
    pub token: Option<String>,

    /// Channel ids the bot watches. The first entry is also the reply
    /// destination.
    #[serde(default)]
    pub watch_channels: Vec<u64>,

    /// Replace the bot's username with the persona's display name on startup.
    #[serde(default)]
    pub use_persona_display_name: bool,

    /// Replace the bot's avatar with the persona's avatar on startup.
    #[serde(default)]
    pub use_persona_avatar: bool,
}

/// AI persona service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PersonaConfig {
    /// API token for the persona service.
    #[serde(default)]
    pub token: Option<String>,

    /// Identifier of the persona character to converse as.
    #[serde(default)]
    pub character_id: String,

    /// Base URL of the persona service API.
    #[serde(default = "default_persona_base_url")]
    pub base_url: String,

    /// Per-request timeout for reply generation, in seconds.
    #[serde(default = "default_persona_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Extra attempts after a transient API error.
    #[serde(default = "default_persona_max_retries")]
    pub max_retries: u32,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            token: None,
            character_id: String::new(),
            base_url: default_persona_base_url(),
            request_timeout_secs: default_persona_timeout_secs(),
            max_retries: default_persona_max_retries(),
        }
    }
}

fn default_persona_base_url() -> String {
    "https://api.persona.chat".to_string()
}

fn default_persona_timeout_secs() -> u64 {
    10
}

fn default_persona_max_retries() -> u32 {
    1
}

/// Pending-context cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Path of the JSON cache file.
    #[serde(default = "default_cache_path")]
    pub path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
        }
    }
}

fn default_cache_path() -> String {
    "messages_cache.json".to_string()
}

/// Debounce/batch dispatch scheduling configuration.
///
/// Dispatch fires at the earlier of "quiet period elapsed" or "backlog
/// full", bounding both end-to-end latency and batch size.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BatchingConfig {
    /// Silence (no message or typing activity) required before a non-empty
    /// cache is dispatched, in seconds.
    #[serde(default = "default_idle_threshold_secs")]
    pub idle_threshold_secs: u64,

    /// Cache entry count at which dispatch fires regardless of silence.
    #[serde(default = "default_batch_threshold")]
    pub batch_threshold: usize,

    /// Inactivity monitor poll period, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            idle_threshold_secs: default_idle_threshold_secs(),
            batch_threshold: default_batch_threshold(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

fn default_idle_threshold_secs() -> u64 {
    7
}

fn default_batch_threshold() -> usize {
    5
}

fn default_poll_interval_secs() -> u64 {
    3
}

/// Message and reply text shaping configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FormattingConfig {
    /// Strip emoji from accepted user messages and display names.
    #[serde(default)]
    pub strip_user_emojis: bool,

    /// Strip emoji from generated persona replies.
    #[serde(default)]
    pub strip_persona_emojis: bool,

    /// Deliver replies one line per chat message instead of as one block.
    #[serde(default)]
    pub line_by_line: bool,

    /// Messages starting with any of these prefixes are ignored.
    #[serde(default = "default_comment_prefixes")]
    pub comment_prefixes: Vec<String>,

    /// Regex patterns removed from accepted user text before caching.
    #[serde(default)]
    pub strip_user_patterns: Vec<String>,

    /// Regex patterns removed from generated replies before delivery.
    #[serde(default)]
    pub strip_persona_patterns: Vec<String>,

    /// Template for a cached message in the conversation batch.
    /// Placeholders: `{username}`, `{name}`, `{message}`.
    #[serde(default = "default_user_template")]
    pub user_template: String,

    /// Template for a cached message that replies to another.
    /// Additional placeholders: `{reply_username}`, `{reply_name}`,
    /// `{reply_message}`.
    #[serde(default = "default_reply_template")]
    pub reply_template: String,
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            strip_user_emojis: false,
            strip_persona_emojis: false,
            line_by_line: false,
            comment_prefixes: default_comment_prefixes(),
            strip_user_patterns: Vec::new(),
            strip_persona_patterns: Vec::new(),
            user_template: default_user_template(),
            reply_template: default_reply_template(),
        }
    }
}

fn default_comment_prefixes() -> Vec<String> {
    vec!["#".to_string(), "//".to_string()]
}

fn default_user_template() -> String {
    "{name}: {message}".to_string()
}

fn default_reply_template() -> String {
    "{name} (replying to {reply_name}: \"{reply_message}\"): {message}".to_string()
}

/// Process-level runtime configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `host:port` probed to verify network reachability before dispatch.
    #[serde(default = "default_probe_addr")]
    pub probe_addr: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            probe_addr: default_probe_addr(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_probe_addr() -> String {
    "www.google.com:80".to_string()
}
