// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock persona adapter for deterministic testing.
//!
//! `MockPersona` implements `PersonaAdapter` with a configurable reply,
//! failure modes, an optional generation delay, and concurrency
//! accounting used to assert dispatch mutual exclusion.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use bridgebot_core::{
    Adapter, BridgeError, CachedMessage, HealthStatus, PersonaAdapter, PersonaInfo,
};

/// A mock persona service for testing.
pub struct MockPersona {
    reply: Mutex<String>,
    queued_replies: Mutex<VecDeque<String>>,
    info: Mutex<PersonaInfo>,
    batches: Mutex<Vec<Vec<CachedMessage>>>,
    delay: Mutex<Duration>,
    fail_generation: AtomicBool,
    fail_info: AtomicBool,
    calls: AtomicUsize,
    info_calls: AtomicUsize,
    current: AtomicUsize,
    max_concurrent: AtomicUsize,
}

impl MockPersona {
    pub fn new() -> Self {
        Self {
            reply: Mutex::new("mock reply".to_string()),
            queued_replies: Mutex::new(VecDeque::new()),
            info: Mutex::new(PersonaInfo {
                display_name: "Mock Persona".to_string(),
                avatar_url: None,
            }),
            batches: Mutex::new(Vec::new()),
            delay: Mutex::new(Duration::ZERO),
            fail_generation: AtomicBool::new(false),
            fail_info: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            info_calls: AtomicUsize::new(0),
            current: AtomicUsize::new(0),
            max_concurrent: AtomicUsize::new(0),
        }
    }

    /// Sets the reply returned by every subsequent generation.
    pub fn set_reply(&self, reply: &str) {
        *self.reply.lock().unwrap() = reply.to_string();
    }

    /// Queues a one-shot reply consumed before the default reply.
    pub fn queue_reply(&self, reply: &str) {
        self.queued_replies
            .lock()
            .unwrap()
            .push_back(reply.to_string());
    }

    /// Sets the persona info returned by `persona_info()`.
    pub fn set_info(&self, display_name: &str, avatar_url: Option<String>) {
        *self.info.lock().unwrap() = PersonaInfo {
            display_name: display_name.to_string(),
            avatar_url,
        };
    }

    /// Makes every generation call fail.
    pub fn fail_generation(&self, fail: bool) {
        self.fail_generation.store(fail, Ordering::SeqCst);
    }

    /// Makes every info call fail.
    pub fn fail_info(&self, fail: bool) {
        self.fail_info.store(fail, Ordering::SeqCst);
    }

    /// Delays each generation, to widen race windows in concurrency tests.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    /// Number of generation calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of `persona_info` calls so far.
    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    /// Highest number of generation calls observed in flight at once.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent.load(Ordering::SeqCst)
    }

    /// Every batch passed to `generate_reply`, in call order.
    pub fn batches(&self) -> Vec<Vec<CachedMessage>> {
        self.batches.lock().unwrap().clone()
    }
}

impl Default for MockPersona {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for MockPersona {
    fn name(&self) -> &str {
        "mock-persona"
    }

    async fn health_check(&self) -> Result<HealthStatus, BridgeError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), BridgeError> {
        Ok(())
    }
}

#[async_trait]
impl PersonaAdapter for MockPersona {
    async fn persona_info(&self) -> Result<PersonaInfo, BridgeError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_info.load(Ordering::SeqCst) {
            return Err(BridgeError::persona("mock info failure"));
        }
        Ok(self.info.lock().unwrap().clone())
    }

    async fn generate_reply(&self, batch: &[CachedMessage]) -> Result<String, BridgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent.fetch_max(in_flight, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if delay > Duration::ZERO {
            tokio::time::sleep(delay).await;
        }

        self.batches.lock().unwrap().push(batch.to_vec());

        let result = if self.fail_generation.load(Ordering::SeqCst) {
            Err(BridgeError::persona("mock generation failure"))
        } else {
            let queued = self.queued_replies.lock().unwrap().pop_front();
            Ok(queued.unwrap_or_else(|| self.reply.lock().unwrap().clone()))
        };

        self.current.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(text: &str) -> CachedMessage {
        CachedMessage {
            username: "rin".into(),
            name: "Rin".into(),
            message: text.into(),
            reply_message: None,
        }
    }

    #[tokio::test]
    async fn returns_configured_reply_and_records_batch() {
        let persona = MockPersona::new();
        persona.set_reply("configured");

        let reply = persona.generate_reply(&[msg("hi")]).await.unwrap();
        assert_eq!(reply, "configured");
        assert_eq!(persona.call_count(), 1);
        assert_eq!(persona.batches()[0][0].message, "hi");
    }

    #[tokio::test]
    async fn queued_replies_are_consumed_first() {
        let persona = MockPersona::new();
        persona.set_reply("default");
        persona.queue_reply("one-shot");

        assert_eq!(persona.generate_reply(&[]).await.unwrap(), "one-shot");
        assert_eq!(persona.generate_reply(&[]).await.unwrap(), "default");
    }

    #[tokio::test]
    async fn failure_mode_returns_persona_error() {
        let persona = MockPersona::new();
        persona.fail_generation(true);

        let err = persona.generate_reply(&[]).await.unwrap_err();
        assert!(matches!(err, BridgeError::Persona { .. }));
    }

    #[tokio::test]
    async fn concurrency_gauge_tracks_overlap() {
        let persona = std::sync::Arc::new(MockPersona::new());
        persona.set_delay(Duration::from_millis(50));

        let a = {
            let p = persona.clone();
            tokio::spawn(async move { p.generate_reply(&[]).await })
        };
        let b = {
            let p = persona.clone();
            tokio::spawn(async move { p.generate_reply(&[]).await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        assert_eq!(persona.call_count(), 2);
        assert_eq!(persona.max_concurrent(), 2);
    }
}
