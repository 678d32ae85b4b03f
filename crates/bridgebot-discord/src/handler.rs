// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway event forwarding.
//!
//! [`ForwardingHandler`] translates serenity gateway events into
//! [`ChatEvent`]s and pushes them onto the adapter's internal queue.
//! Filtering (watch list, own messages, comment markers) happens in the
//! engine's collector, not here.

use bridgebot_core::{ChannelId, ChatEvent, MessageEvent, MessageId, TypingEvent, UserId};
use serenity::client::{Context, EventHandler};
use serenity::model::channel::Message;
use serenity::model::event::TypingStartEvent;
use serenity::model::gateway::Ready;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Forwards gateway events into the adapter's inbound queue.
pub struct ForwardingHandler {
    tx: mpsc::Sender<ChatEvent>,
}

impl ForwardingHandler {
    pub fn new(tx: mpsc::Sender<ChatEvent>) -> Self {
        Self { tx }
    }

    async fn forward(&self, event: ChatEvent) {
        if self.tx.send(event).await.is_err() {
            warn!("inbound event queue closed, dropping event");
        }
    }
}

#[serenity::async_trait]
impl EventHandler for ForwardingHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, "gateway session ready");
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        debug!(channel_id = msg.channel_id.get(), "gateway message received");
        self.forward(ChatEvent::Message(to_message_event(&msg))).await;
    }

    async fn typing_start(&self, _ctx: Context, event: TypingStartEvent) {
        self.forward(ChatEvent::Typing(TypingEvent {
            channel_id: ChannelId(event.channel_id.get()),
            user_id: UserId(event.user_id.get()),
        }))
        .await;
    }
}

/// Translates a serenity message into the engine's event type.
pub fn to_message_event(msg: &Message) -> MessageEvent {
    MessageEvent {
        channel_id: ChannelId(msg.channel_id.get()),
        sender_id: UserId(msg.author.id.get()),
        sender_name: msg.author.name.clone(),
        display_name: display_name_of(msg.author.global_name.as_deref(), &msg.author.name),
        content: msg.content.clone(),
        reply_to: msg
            .message_reference
            .as_ref()
            .and_then(|r| r.message_id)
            .map(|id| MessageId(id.get())),
    }
}

/// A user's display name falls back to the handle when no global name is set.
pub fn display_name_of(global_name: Option<&str>, name: &str) -> String {
    global_name.unwrap_or(name).to_string()
}
