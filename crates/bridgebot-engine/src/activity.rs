// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared activity state.
//!
//! One [`ActivityState`] instance is created at startup and passed by
//! reference into the collector, the inactivity monitor, and the dispatch
//! coordinator -- never reached through ambient globals.
//!
//! Timestamp updates are fire-and-forget, last-writer-wins. The
//! `awaiting_response` flag is only a fast pre-check; the dispatch
//! coordinator's mutex is the authoritative exclusion gate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Process-wide activity state shared by collector, monitor, and coordinator.
pub struct ActivityState {
    last_activity: Mutex<Instant>,
    awaiting_response: AtomicBool,
}

impl ActivityState {
    /// Creates fresh state: activity "now", no dispatch in flight.
    pub fn new() -> Self {
        Self {
            last_activity: Mutex::new(Instant::now()),
            awaiting_response: AtomicBool::new(false),
        }
    }

    /// Records activity at the current instant.
    pub async fn touch(&self) {
        *self.last_activity.lock().await = Instant::now();
    }

    /// Elapsed time since the last recorded activity.
    pub async fn idle_for(&self) -> Duration {
        self.last_activity.lock().await.elapsed()
    }

    /// Whether a dispatch is currently in flight.
    pub fn awaiting_response(&self) -> bool {
        self.awaiting_response.load(Ordering::SeqCst)
    }

    /// Marks a dispatch as in flight (or finished).
    pub fn set_awaiting_response(&self, value: bool) {
        self.awaiting_response.store(value, Ordering::SeqCst);
    }
}

impl Default for ActivityState {
    fn default() -> Self {
        Self::new()
    }
}
