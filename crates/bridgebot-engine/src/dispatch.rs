// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The dispatch coordinator.
//!
//! One dispatch cycle: snapshot the cache, ask the persona service for a
//! reply, deliver it to the reply channel, and reconcile the cache.
//! `Idle -> Dispatching -> Idle`; any failure also returns to idle --
//! failures are transient and retried on the monitor's own schedule.
//!
//! Entry is guarded twice: the `awaiting_response` flag is a cheap
//! pre-check, the internal mutex is the authoritative gate, so at most one
//! dispatch is in flight even when multiple triggers race.

use std::sync::Arc;

use bridgebot_cache::{CacheSnapshot, CacheStore};
use bridgebot_core::{BridgeError, ChannelAdapter, ChannelId, PersonaAdapter};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::activity::ActivityState;
use crate::connectivity::ConnectivityProbe;
use crate::scrub::{strip_emoji, Scrubber};

/// Delivery settings for the coordinator.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Channel the generated reply is delivered to.
    pub reply_channel: ChannelId,
    /// Send each non-blank reply line as a separate message.
    pub line_by_line: bool,
    /// Strip emoji from the generated reply.
    pub strip_persona_emojis: bool,
}

/// How a dispatch cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Reply generated and delivered as `delivered` messages.
    Dispatched { delivered: usize },
    /// Reply generated but the destination channel does not exist.
    /// The snapshot is still reconciled away (accepted lossy edge case).
    Undeliverable,
    /// Network unreachable; nothing was mutated.
    Offline,
    /// The cache was empty at snapshot time; nothing to do.
    EmptyCache,
    /// Another dispatch is already in flight.
    AlreadyInFlight,
}

/// Mutually exclusive dispatch state machine.
pub struct DispatchCoordinator {
    channel: Arc<dyn ChannelAdapter>,
    persona: Arc<dyn PersonaAdapter>,
    store: Arc<CacheStore>,
    activity: Arc<ActivityState>,
    probe: Arc<dyn ConnectivityProbe>,
    scrubber: Scrubber,
    settings: DispatchSettings,
    lock: Mutex<()>,
}

impl DispatchCoordinator {
    pub fn new(
        channel: Arc<dyn ChannelAdapter>,
        persona: Arc<dyn PersonaAdapter>,
        store: Arc<CacheStore>,
        activity: Arc<ActivityState>,
        probe: Arc<dyn ConnectivityProbe>,
        scrubber: Scrubber,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            channel,
            persona,
            store,
            activity,
            probe,
            scrubber,
            settings,
            lock: Mutex::new(()),
        }
    }

    /// Runs one dispatch cycle.
    ///
    /// Whatever happens after the snapshot is taken -- success, generation
    /// failure, or delivery failure -- the `awaiting_response` flag is
    /// cleared, the activity timestamp refreshed, and the snapshot
    /// reconciled out of the cache. Entries that arrived after the snapshot
    /// survive untouched.
    pub async fn dispatch(&self) -> Result<DispatchOutcome, BridgeError> {
        if self.activity.awaiting_response() {
            debug!("dispatch already in flight, skipping");
            return Ok(DispatchOutcome::AlreadyInFlight);
        }

        let _guard = self.lock.lock().await;
        self.activity.set_awaiting_response(true);

        if !self.probe.is_reachable().await {
            warn!("network unreachable, dispatch aborted");
            self.activity.set_awaiting_response(false);
            return Ok(DispatchOutcome::Offline);
        }

        let snapshot = self.store.snapshot().await;
        if snapshot.is_empty() {
            debug!("cache empty at snapshot time, nothing to dispatch");
            self.activity.set_awaiting_response(false);
            return Ok(DispatchOutcome::EmptyCache);
        }

        let result = self.generate_and_deliver(&snapshot).await;

        self.activity.set_awaiting_response(false);
        self.activity.touch().await;
        if let Err(e) = self.store.reconcile(&snapshot).await {
            error!(error = %e, "cache reconciliation failed");
        }

        result
    }

    async fn generate_and_deliver(
        &self,
        snapshot: &CacheSnapshot,
    ) -> Result<DispatchOutcome, BridgeError> {
        let batch = snapshot.messages();
        let reply = self.persona.generate_reply(&batch).await?;
        debug!(entries = batch.len(), chars = reply.len(), "persona reply received");

        let reply = self.scrubber.apply(&reply);
        let reply = if self.settings.strip_persona_emojis {
            strip_emoji(&reply)
        } else {
            reply
        };

        if reply.trim().is_empty() {
            info!("persona reply empty after shaping, nothing delivered");
            return Ok(DispatchOutcome::Dispatched { delivered: 0 });
        }

        let mut delivered = 0usize;
        if self.settings.line_by_line {
            for line in reply.lines().filter(|l| !l.trim().is_empty()) {
                match self.channel.send(self.settings.reply_channel, line).await {
                    Ok(()) => delivered += 1,
                    Err(BridgeError::ChannelNotFound { channel_id }) => {
                        error!(%channel_id, "reply channel not found, response dropped");
                        return Ok(DispatchOutcome::Undeliverable);
                    }
                    Err(e) => return Err(e),
                }
            }
        } else {
            match self.channel.send(self.settings.reply_channel, &reply).await {
                Ok(()) => delivered = 1,
                Err(BridgeError::ChannelNotFound { channel_id }) => {
                    error!(%channel_id, "reply channel not found, response dropped");
                    return Ok(DispatchOutcome::Undeliverable);
                }
                Err(e) => return Err(e),
            }
        }

        info!(delivered, "reply delivered");
        Ok(DispatchOutcome::Dispatched { delivered })
    }
}
