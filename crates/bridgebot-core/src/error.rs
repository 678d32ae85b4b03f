// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the bridgebot workspace.

use thiserror::Error;

use crate::types::ChannelId;

/// The primary error type used across all bridgebot adapters and core operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Cache store errors (unreadable file, malformed JSON, failed persist).
    #[error("cache error: {message}")]
    Cache {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Chat platform errors (gateway failure, send failure, message fetch failure).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The reply destination channel does not exist at delivery time.
    #[error("channel not found: {channel_id}")]
    ChannelNotFound { channel_id: ChannelId },

    /// AI persona service errors (API failure, timeout, malformed response).
    #[error("persona error: {message}")]
    Persona {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No network connectivity; the current dispatch cycle is aborted.
    #[error("network unreachable")]
    Offline,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Shorthand for a channel error without an underlying source.
    pub fn channel(message: impl Into<String>) -> Self {
        BridgeError::Channel {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a persona error without an underlying source.
    pub fn persona(message: impl Into<String>) -> Self {
        BridgeError::Persona {
            message: message.into(),
            source: None,
        }
    }
}
