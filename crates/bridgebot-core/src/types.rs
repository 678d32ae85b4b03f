// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the bridgebot workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a chat platform channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

/// Unique identifier for a chat platform user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Unique identifier for a chat platform message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// An inbound chat message delivered by a channel adapter.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub channel_id: ChannelId,
    pub sender_id: UserId,
    /// Platform identity handle of the sender (stable, unique).
    pub sender_name: String,
    /// Human-facing display name of the sender.
    pub display_name: String,
    pub content: String,
    /// Message this one replies to, if any. Resolved lazily via
    /// [`ChannelAdapter::fetch_message`](crate::ChannelAdapter::fetch_message).
    pub reply_to: Option<MessageId>,
}

/// A typing notification delivered by a channel adapter.
#[derive(Debug, Clone, Copy)]
pub struct TypingEvent {
    pub channel_id: ChannelId,
    pub user_id: UserId,
}

/// Any event the engine consumes from the chat platform.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    Message(MessageEvent),
    Typing(TypingEvent),
}

/// A resolved reference to an existing chat message.
///
/// Returned by `fetch_message` when the collector resolves a reply reference.
#[derive(Debug, Clone)]
pub struct MessageRef {
    pub sender_name: String,
    pub display_name: String,
    pub content: String,
}

/// Display name and avatar of the AI persona character.
#[derive(Debug, Clone)]
pub struct PersonaInfo {
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// A single entry in the pending-context cache.
///
/// The serialized field names are a stable on-disk contract: external tools
/// read the cache file as the literal pending-context queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedMessage {
    /// Platform identity handle of the author.
    pub username: String,
    /// Human-facing display name of the author.
    pub name: String,
    /// Message text.
    pub message: String,
    /// Context of the message this one replied to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_message: Option<ReplyContext>,
}

/// The replied-to message captured alongside a [`CachedMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyContext {
    pub username: String,
    pub name: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_message_roundtrips_wire_field_names() {
        let msg = CachedMessage {
            username: "rin".into(),
            name: "Rin".into(),
            message: "hello".into(),
            reply_message: Some(ReplyContext {
                username: "aoi".into(),
                name: "Aoi".into(),
                message: "hi there".into(),
            }),
        };

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["username"], "rin");
        assert_eq!(json["name"], "Rin");
        assert_eq!(json["message"], "hello");
        assert_eq!(json["reply_message"]["username"], "aoi");

        let parsed: CachedMessage = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn cached_message_omits_absent_reply() {
        let msg = CachedMessage {
            username: "rin".into(),
            name: "Rin".into(),
            message: "hello".into(),
            reply_message: None,
        };

        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("reply_message").is_none());

        let parsed: CachedMessage =
            serde_json::from_str(r#"{"username":"rin","name":"Rin","message":"hello"}"#).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn ids_display_as_raw_numbers() {
        assert_eq!(ChannelId(42).to_string(), "42");
        assert_eq!(UserId(7).to_string(), "7");
        assert_eq!(MessageId(9001).to_string(), "9001");
    }
}
