// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock adapters for deterministic Valet tests.
//!
//! Everything here records what it was asked to do and returns canned
//! data, so pipeline tests can run without a provider, a Redis, or any
//! collaborator network calls.

pub mod mock_connectors;
pub mod mock_delivery;
pub mod mock_provider;

pub use mock_connectors::{MockCalendar, MockTasks};
pub use mock_delivery::{
    EmittedEvent, FailingPresence, MockNotifier, MockTransport, SentNotification,
};
pub use mock_provider::{MockProvider, text_reply};
