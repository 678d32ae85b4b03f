// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for bridgebot integration tests.
//!
//! Mock implementations of the channel and persona adapter traits, with
//! injectable inputs, captured outputs, and failure modes.

pub mod mock_channel;
pub mod mock_persona;

pub use mock_channel::{MockChannel, SendFailure};
pub use mock_persona::MockPersona;
