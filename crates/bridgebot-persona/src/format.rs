// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation batch rendering.
//!
//! Turns an ordered batch of cached messages into the single text block the
//! persona service receives. Each entry is rendered through a configurable
//! template; entries carrying reply context use the reply template.

use bridgebot_core::CachedMessage;

/// Templates used to render a conversation batch.
#[derive(Debug, Clone)]
pub struct BatchFormat {
    user_template: String,
    reply_template: String,
}

impl BatchFormat {
    pub fn new(user_template: String, reply_template: String) -> Self {
        Self {
            user_template,
            reply_template,
        }
    }

    /// Renders the batch in arrival order, one entry per line.
    pub fn render(&self, batch: &[CachedMessage]) -> String {
        batch
            .iter()
            .map(|entry| self.render_one(entry))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_one(&self, entry: &CachedMessage) -> String {
        match &entry.reply_message {
            None => self
                .user_template
                .replace("{username}", &entry.username)
                .replace("{name}", &entry.name)
                .replace("{message}", &entry.message),
            Some(reply) => self
                .reply_template
                .replace("{username}", &entry.username)
                .replace("{name}", &entry.name)
                .replace("{reply_username}", &reply.username)
                .replace("{reply_name}", &reply.name)
                .replace("{reply_message}", &reply.message)
                .replace("{message}", &entry.message),
        }
    }
}
