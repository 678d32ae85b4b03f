// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` with injectable inbound events
//! and captured outbound messages for assertion in tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use bridgebot_core::{
    Adapter, BridgeError, ChannelAdapter, ChannelId, ChatEvent, HealthStatus, MessageId,
    MessageRef, UserId,
};

/// How `send()` should fail, when a failure mode is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendFailure {
    /// Fail with `BridgeError::ChannelNotFound`.
    ChannelNotFound,
    /// Fail with a generic channel error.
    Error,
}

/// A mock chat platform for testing.
///
/// Provides:
/// - **events**: injected via `inject_event()`, returned by `next_event()`
/// - **sent**: messages passed to `send()`, retrievable via `sent_messages()`
/// - **fetchable**: canned `fetch_message` responses
/// - **identity edits**: recorded `edit_identity` calls
pub struct MockChannel {
    events: Mutex<VecDeque<ChatEvent>>,
    notify: Notify,
    sent: Mutex<Vec<(ChannelId, String)>>,
    identity_edits: Mutex<Vec<(Option<String>, Option<Vec<u8>>)>>,
    fetchable: Mutex<HashMap<(ChannelId, MessageId), MessageRef>>,
    send_failure: std::sync::Mutex<Option<SendFailure>>,
    fail_fetch: AtomicBool,
    bot_id: std::sync::Mutex<Option<UserId>>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            sent: Mutex::new(Vec::new()),
            identity_edits: Mutex::new(Vec::new()),
            fetchable: Mutex::new(HashMap::new()),
            send_failure: std::sync::Mutex::new(None),
            fail_fetch: AtomicBool::new(false),
            bot_id: std::sync::Mutex::new(Some(UserId(1))),
        }
    }

    /// Injects an inbound event; the next `next_event()` call returns it.
    pub async fn inject_event(&self, event: ChatEvent) {
        self.events.lock().await.push_back(event);
        self.notify.notify_one();
    }

    /// All messages sent through `send()`, in order.
    pub async fn sent_messages(&self) -> Vec<(ChannelId, String)> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Registers a canned response for `fetch_message`.
    pub async fn add_fetchable_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        message: MessageRef,
    ) {
        self.fetchable
            .lock()
            .await
            .insert((channel_id, message_id), message);
    }

    /// Makes every `fetch_message` call fail.
    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    /// Arms (or clears) a failure mode for `send()`.
    pub fn set_send_failure(&self, failure: Option<SendFailure>) {
        *self.send_failure.lock().unwrap() = failure;
    }

    /// Overrides the bot's own user id (default `UserId(1)`).
    pub fn set_bot_user_id(&self, id: Option<UserId>) {
        *self.bot_id.lock().unwrap() = id;
    }

    /// All recorded `edit_identity` calls.
    pub async fn identity_edits(&self) -> Vec<(Option<String>, Option<Vec<u8>>)> {
        self.identity_edits.lock().await.clone()
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    async fn health_check(&self) -> Result<HealthStatus, BridgeError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), BridgeError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn connect(&mut self) -> Result<(), BridgeError> {
        Ok(())
    }

    async fn next_event(&self) -> Result<ChatEvent, BridgeError> {
        loop {
            {
                let mut queue = self.events.lock().await;
                if let Some(event) = queue.pop_front() {
                    return Ok(event);
                }
            }
            // Wait for notification that a new event was injected.
            self.notify.notified().await;
        }
    }

    async fn fetch_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<MessageRef, BridgeError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(BridgeError::channel("mock fetch failure"));
        }
        self.fetchable
            .lock()
            .await
            .get(&(channel_id, message_id))
            .cloned()
            .ok_or_else(|| BridgeError::channel("message not found"))
    }

    async fn send(&self, channel_id: ChannelId, text: &str) -> Result<(), BridgeError> {
        match *self.send_failure.lock().unwrap() {
            Some(SendFailure::ChannelNotFound) => {
                return Err(BridgeError::ChannelNotFound { channel_id });
            }
            Some(SendFailure::Error) => {
                return Err(BridgeError::channel("mock send failure"));
            }
            None => {}
        }
        self.sent.lock().await.push((channel_id, text.to_string()));
        Ok(())
    }

    async fn edit_identity(
        &self,
        username: Option<&str>,
        avatar: Option<Vec<u8>>,
    ) -> Result<(), BridgeError> {
        self.identity_edits
            .lock()
            .await
            .push((username.map(String::from), avatar));
        Ok(())
    }

    fn bot_user_id(&self) -> Option<UserId> {
        *self.bot_id.lock().unwrap()
    }
}
