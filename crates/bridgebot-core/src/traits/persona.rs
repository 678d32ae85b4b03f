// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persona adapter trait for the conversational-AI character service.

use async_trait::async_trait;

use crate::error::BridgeError;
use crate::traits::adapter::Adapter;
use crate::types::{CachedMessage, PersonaInfo};

/// Adapter for the AI persona service.
///
/// The persona adapter turns an ordered batch of cached chat messages into
/// a single in-character reply, and exposes the character's public identity
/// for profile synchronization.
#[async_trait]
pub trait PersonaAdapter: Adapter {
    /// Fetches the persona's display name and avatar URL.
    async fn persona_info(&self) -> Result<PersonaInfo, BridgeError>;

    /// Generates a reply from an ordered conversation batch.
    ///
    /// The batch is the dispatch snapshot in arrival order; the returned
    /// text is the raw reply, before any configured post-processing.
    async fn generate_reply(&self, batch: &[CachedMessage]) -> Result<String, BridgeError>;
}
