// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable pending-context cache for bridgebot.
//!
//! The cache is the system's only durable state for pending conversation
//! context: an ordered JSON array of chat entries, mirrored to disk on
//! every mutation with an atomic replace. See [`CacheStore`].

pub mod store;

pub use store::{CacheSnapshot, CacheStore, SeqEntry};
