// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for the chat platform integration.

use async_trait::async_trait;

use crate::error::BridgeError;
use crate::traits::adapter::Adapter;
use crate::types::{ChannelId, ChatEvent, MessageId, MessageRef, UserId};

/// Adapter for the bidirectional chat platform connection.
///
/// The channel adapter delivers inbound message and typing events, and
/// exposes the outbound operations the engine needs: message lookup for
/// reply resolution, text delivery, and bot identity edits.
#[async_trait]
pub trait ChannelAdapter: Adapter {
    /// Establishes the connection to the chat platform.
    async fn connect(&mut self) -> Result<(), BridgeError>;

    /// Receives the next inbound event from the platform.
    async fn next_event(&self) -> Result<ChatEvent, BridgeError>;

    /// Fetches an existing message, used to resolve reply references.
    async fn fetch_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<MessageRef, BridgeError>;

    /// Sends a text message to a channel.
    ///
    /// Returns [`BridgeError::ChannelNotFound`] when the destination channel
    /// does not exist.
    async fn send(&self, channel_id: ChannelId, text: &str) -> Result<(), BridgeError>;

    /// Updates the bot's own username and/or avatar image.
    async fn edit_identity(
        &self,
        username: Option<&str>,
        avatar: Option<Vec<u8>>,
    ) -> Result<(), BridgeError>;

    /// The bot's own user id, available once connected.
    fn bot_user_id(&self) -> Option<UserId>;
}
