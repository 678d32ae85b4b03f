// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the bridgebot workspace.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the workspace. The chat platform and AI
//! persona collaborators implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::BridgeError;
pub use types::{
    CachedMessage, ChannelId, ChatEvent, HealthStatus, MessageEvent, MessageId, MessageRef,
    PersonaInfo, ReplyContext, TypingEvent, UserId,
};

pub use traits::{Adapter, ChannelAdapter, PersonaAdapter};
