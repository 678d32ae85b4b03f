// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.

pub mod adapter;
pub mod channel;
pub mod persona;

pub use adapter::Adapter;
pub use channel::ChannelAdapter;
pub use persona::PersonaAdapter;
