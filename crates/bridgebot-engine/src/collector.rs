// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound message collection.
//!
//! The collector filters chat events, resolves reply references through the
//! channel adapter, shapes the text per formatting config, appends accepted
//! entries to the cache store, and refreshes the shared activity state.

use std::sync::Arc;

use bridgebot_cache::CacheStore;
use bridgebot_core::{
    BridgeError, CachedMessage, ChannelAdapter, ChannelId, MessageEvent, MessageRef,
    ReplyContext, TypingEvent, UserId,
};
use tracing::{debug, warn};

use crate::activity::ActivityState;
use crate::scrub::{strip_emoji, Scrubber};

/// Filtering and shaping settings for the collector.
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    /// Channels the bot listens to.
    pub watch_channels: Vec<ChannelId>,
    /// The bot's own user id; its messages are never cached.
    pub bot_id: UserId,
    /// Messages starting with any of these prefixes are ignored.
    pub comment_prefixes: Vec<String>,
    /// Strip emoji from accepted content and display names.
    pub strip_user_emojis: bool,
}

/// Accepts inbound chat events and feeds the pending-context cache.
pub struct MessageCollector {
    channel: Arc<dyn ChannelAdapter>,
    store: Arc<CacheStore>,
    activity: Arc<ActivityState>,
    scrubber: Scrubber,
    settings: CollectorSettings,
}

impl MessageCollector {
    pub fn new(
        channel: Arc<dyn ChannelAdapter>,
        store: Arc<CacheStore>,
        activity: Arc<ActivityState>,
        scrubber: Scrubber,
        settings: CollectorSettings,
    ) -> Self {
        Self {
            channel,
            store,
            activity,
            scrubber,
            settings,
        }
    }

    /// Processes one inbound message.
    ///
    /// Returns `Ok(true)` when the message was cached, `Ok(false)` when it
    /// was filtered out (unwatched channel, own message, comment marker, or
    /// empty after scrubbing). A failing reply-reference lookup degrades to
    /// caching without reply context; it never fails the whole accept.
    pub async fn accept(&self, event: MessageEvent) -> Result<bool, BridgeError> {
        if !self.is_watched(event.channel_id) {
            return Ok(false);
        }
        if event.sender_id == self.settings.bot_id {
            return Ok(false);
        }
        if self
            .settings
            .comment_prefixes
            .iter()
            .any(|p| event.content.starts_with(p.as_str()))
        {
            debug!(channel_id = %event.channel_id, "ignoring comment-marked message");
            return Ok(false);
        }

        let reply_message = match event.reply_to {
            Some(message_id) => {
                match self.channel.fetch_message(event.channel_id, message_id).await {
                    Ok(referenced) => Some(self.shape_reply(referenced)),
                    Err(e) => {
                        warn!(
                            message_id = %message_id,
                            error = %e,
                            "failed to resolve reply reference, storing without context"
                        );
                        None
                    }
                }
            }
            None => None,
        };

        let (name, content) = self.shape_text(event.display_name, event.content);
        if content.is_empty() {
            debug!("message empty after scrubbing, not cached");
            self.activity.touch().await;
            return Ok(false);
        }

        self.store
            .append(CachedMessage {
                username: event.sender_name,
                name,
                message: content,
                reply_message,
            })
            .await?;
        self.activity.touch().await;

        let pending = self.store.len().await;
        debug!(
            channel_id = %event.channel_id,
            pending = pending,
            "message cached"
        );
        Ok(true)
    }

    /// Refreshes the activity timestamp for a human typing in a watched
    /// channel, without adding a cache entry.
    pub async fn on_typing(&self, event: TypingEvent) {
        if self.is_watched(event.channel_id) && event.user_id != self.settings.bot_id {
            self.activity.touch().await;
            debug!(
                user_id = %event.user_id,
                channel_id = %event.channel_id,
                "typing activity recorded"
            );
        }
    }

    fn is_watched(&self, channel_id: ChannelId) -> bool {
        self.settings.watch_channels.contains(&channel_id)
    }

    fn shape_text(&self, display_name: String, content: String) -> (String, String) {
        let content = self.scrubber.apply(&content);
        if self.settings.strip_user_emojis {
            (strip_emoji(&display_name), strip_emoji(&content))
        } else {
            (display_name, content)
        }
    }

    fn shape_reply(&self, referenced: MessageRef) -> ReplyContext {
        let (name, message) = self.shape_text(referenced.display_name, referenced.content);
        ReplyContext {
            username: referenced.sender_name,
            name,
            message,
        }
    }
}
