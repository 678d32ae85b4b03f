// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by all bridgebot adapters.

use async_trait::async_trait;

use crate::error::BridgeError;
use crate::types::HealthStatus;

/// The base trait for bridgebot adapters.
///
/// Both external collaborators (chat platform, persona service) implement
/// this trait, which provides identity, health checks, and shutdown.
#[async_trait]
pub trait Adapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, BridgeError>;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), BridgeError>;
}
