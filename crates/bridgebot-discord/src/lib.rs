// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discord channel adapter for bridgebot.
//!
//! Implements [`ChannelAdapter`] over serenity: the gateway connection
//! forwards message and typing events into an internal queue consumed via
//! `next_event()`, while outbound operations (send, message fetch, profile
//! edits) go through the REST client.

pub mod handler;

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use bridgebot_config::model::DiscordConfig;
use bridgebot_core::{
    Adapter, BridgeError, ChannelAdapter, ChannelId, ChatEvent, HealthStatus, MessageId,
    MessageRef, UserId,
};
use serenity::http::{Http, HttpError};
use serenity::model::gateway::GatewayIntents;
use serenity::Client;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::handler::{display_name_of, ForwardingHandler};

/// Discord channel adapter implementing [`ChannelAdapter`].
pub struct DiscordChannel {
    token: String,
    http: Arc<Http>,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<ChatEvent>>,
    inbound_tx: mpsc::Sender<ChatEvent>,
    gateway_handle: Option<tokio::task::JoinHandle<()>>,
    bot_id: OnceLock<UserId>,
}

impl DiscordChannel {
    /// Creates a new Discord channel adapter.
    ///
    /// Requires `config.token` to be set.
    pub fn new(config: &DiscordConfig) -> Result<Self, BridgeError> {
        let token = config.token.as_deref().ok_or_else(|| {
            BridgeError::Config("discord.token is required for the Discord adapter".into())
        })?;

        if token.is_empty() {
            return Err(BridgeError::Config("discord.token cannot be empty".into()));
        }

        let http = Arc::new(Http::new(token));
        let (inbound_tx, inbound_rx) = mpsc::channel(512);

        Ok(Self {
            token: token.to_string(),
            http,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            gateway_handle: None,
            bot_id: OnceLock::new(),
        })
    }
}

#[async_trait]
impl Adapter for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn health_check(&self) -> Result<HealthStatus, BridgeError> {
        match self.http.get_current_user().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Discord API unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), BridgeError> {
        // The gateway task is aborted when DiscordChannel is dropped. For a
        // graceful stop, the engine stops calling next_event() first.
        info!("discord channel shutting down");
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for DiscordChannel {
    async fn connect(&mut self) -> Result<(), BridgeError> {
        if self.gateway_handle.is_some() {
            return Ok(()); // Already connected
        }

        // Identify ourselves over REST before the gateway comes up, so the
        // collector can filter the bot's own messages from the first event.
        let me = self
            .http
            .get_current_user()
            .await
            .map_err(|e| BridgeError::Channel {
                message: format!("failed to identify bot user: {e}"),
                source: Some(Box::new(e)),
            })?;
        let _ = self.bot_id.set(UserId(me.id.get()));
        info!(user = %me.name, "logged in");

        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::GUILD_MESSAGE_TYPING
            | GatewayIntents::MESSAGE_CONTENT;

        let handler = ForwardingHandler::new(self.inbound_tx.clone());
        let mut client = Client::builder(&self.token, intents)
            .event_handler(handler)
            .await
            .map_err(|e| BridgeError::Channel {
                message: format!("failed to build gateway client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let handle = tokio::spawn(async move {
            if let Err(e) = client.start().await {
                error!(error = %e, "gateway connection ended");
            }
        });
        self.gateway_handle = Some(handle);

        info!("discord gateway started");
        Ok(())
    }

    async fn next_event(&self) -> Result<ChatEvent, BridgeError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv()
            .await
            .ok_or_else(|| BridgeError::channel("discord inbound event queue closed"))
    }

    async fn fetch_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<MessageRef, BridgeError> {
        let message = self
            .http
            .get_message(
                serenity::model::id::ChannelId::new(channel_id.0),
                serenity::model::id::MessageId::new(message_id.0),
            )
            .await
            .map_err(|e| BridgeError::Channel {
                message: format!("failed to fetch message {message_id}: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(MessageRef {
            sender_name: message.author.name.clone(),
            display_name: display_name_of(
                message.author.global_name.as_deref(),
                &message.author.name,
            ),
            content: message.content.clone(),
        })
    }

    async fn send(&self, channel_id: ChannelId, text: &str) -> Result<(), BridgeError> {
        serenity::model::id::ChannelId::new(channel_id.0)
            .say(self.http.as_ref(), text)
            .await
            .map(|_| ())
            .map_err(|e| map_send_error(channel_id, e))
    }

    async fn edit_identity(
        &self,
        username: Option<&str>,
        avatar: Option<Vec<u8>>,
    ) -> Result<(), BridgeError> {
        let mut profile = serenity::builder::EditProfile::new();
        if let Some(name) = username {
            profile = profile.username(name);
        }
        if let Some(bytes) = avatar {
            let attachment = serenity::builder::CreateAttachment::bytes(bytes, "avatar.png");
            profile = profile.avatar(&attachment);
        }

        self.http
            .edit_profile(&profile)
            .await
            .map(|_| ())
            .map_err(|e| BridgeError::Channel {
                message: format!("failed to edit bot profile: {e}"),
                source: Some(Box::new(e)),
            })
    }

    fn bot_user_id(&self) -> Option<UserId> {
        self.bot_id.get().copied()
    }
}

/// Maps a serenity send error, surfacing a missing destination channel as
/// [`BridgeError::ChannelNotFound`].
fn map_send_error(channel_id: ChannelId, err: serenity::Error) -> BridgeError {
    if let serenity::Error::Http(HttpError::UnsuccessfulRequest(ref response)) = err
        && response.status_code.as_u16() == 404
    {
        warn!(%channel_id, "destination channel does not exist");
        return BridgeError::ChannelNotFound { channel_id };
    }
    BridgeError::Channel {
        message: format!("failed to send message: {err}"),
        source: Some(Box::new(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_requires_token() {
        let config = DiscordConfig::default();
        assert!(DiscordChannel::new(&config).is_err());
    }

    #[test]
    fn new_rejects_empty_token() {
        let config = DiscordConfig {
            token: Some(String::new()),
            ..DiscordConfig::default()
        };
        assert!(DiscordChannel::new(&config).is_err());
    }

    #[test]
    fn new_accepts_valid_token() {
        let config = DiscordConfig {
            token: Some("Bot abc123".into()),
            watch_channels: vec![1],
            ..DiscordConfig::default()
        };
        let channel = DiscordChannel::new(&config).unwrap();
        assert_eq!(channel.name(), "discord");
        assert!(channel.bot_user_id().is_none(), "unknown before connect");
    }
}
