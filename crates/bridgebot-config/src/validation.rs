// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as positive thresholds, compilable regex patterns,
//! and template placeholder sanity.

use crate::diagnostic::ConfigError;
use crate::model::BridgeConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.batching.idle_threshold_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "batching.idle_threshold_secs must be positive".to_string(),
        });
    }

    if config.batching.batch_threshold == 0 {
        errors.push(ConfigError::Validation {
            message: "batching.batch_threshold must be positive".to_string(),
        });
    }

    if config.batching.poll_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "batching.poll_interval_secs must be positive".to_string(),
        });
    }

    if config.cache.path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "cache.path must not be empty".to_string(),
        });
    }

    if config.persona.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "persona.request_timeout_secs must be positive".to_string(),
        });
    }

    // A bot token without any watched channel would connect and then sit
    // deaf; reject the combination early.
    if config.discord.token.is_some() && config.discord.watch_channels.is_empty() {
        errors.push(ConfigError::Validation {
            message: "discord.watch_channels must not be empty when discord.token is set"
                .to_string(),
        });
    }

    if config.persona.token.is_some() && config.persona.character_id.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "persona.character_id must be set when persona.token is set".to_string(),
        });
    }

    for (i, prefix) in config.formatting.comment_prefixes.iter().enumerate() {
        if prefix.is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("formatting.comment_prefixes[{i}] must not be empty"),
            });
        }
    }

    for (i, pattern) in config.formatting.strip_user_patterns.iter().enumerate() {
        if let Err(e) = regex::Regex::new(pattern) {
            errors.push(ConfigError::Validation {
                message: format!("formatting.strip_user_patterns[{i}] is not a valid regex: {e}"),
            });
        }
    }

    for (i, pattern) in config.formatting.strip_persona_patterns.iter().enumerate() {
        if let Err(e) = regex::Regex::new(pattern) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "formatting.strip_persona_patterns[{i}] is not a valid regex: {e}"
                ),
            });
        }
    }

    if !config.formatting.user_template.contains("{message}") {
        errors.push(ConfigError::Validation {
            message: "formatting.user_template must contain the {message} placeholder"
                .to_string(),
        });
    }

    if !config.formatting.reply_template.contains("{message}") {
        errors.push(ConfigError::Validation {
            message: "formatting.reply_template must contain the {message} placeholder"
                .to_string(),
        });
    }

    if !config.runtime.probe_addr.contains(':') {
        errors.push(ConfigError::Validation {
            message: format!(
                "runtime.probe_addr `{}` must be host:port",
                config.runtime.probe_addr
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
