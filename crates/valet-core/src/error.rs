// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Valet assistant backend.

use thiserror::Error;

/// The primary error type used across all Valet adapter traits and pipeline
/// operations.
///
/// Tool failures are deliberately absent: an unknown tool name or a failing
/// tool handler becomes a [`crate::types::ToolOutcome::Error`] fed back to
/// the model, never an error that crosses the agent loop.
#[derive(Debug, Error)]
pub enum ValetError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// The LLM provider cannot be reached or is not configured.
    ///
    /// Fatal to the current prompt; nothing is delivered and no partial
    /// conversation state is persisted.
    #[error("provider unavailable: {message}")]
    ProviderUnavailable {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The tool-call loop exceeded its configured round-trip ceiling.
    #[error("tool loop exceeded {limit} round trips")]
    ToolLoopExceeded { limit: u32 },

    /// Durable queue write failed. Surfaced to the caller as a failed
    /// delivery: silently dropping a payload would break the durability
    /// contract.
    #[error("queue store error: {source}")]
    QueueStore {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Storage backend errors outside the queue path (user records, tokens).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Presence store read/write failed. Callers on the delivery path treat
    /// this as "assume offline".
    #[error("presence check failed: {message}")]
    PresenceCheck { message: String },

    /// A live-transport push or notification send failed after the payload
    /// was already persisted.
    #[error("delivery failure: {message}")]
    Delivery { message: String },

    /// Transport-level errors (bind failure, closed channel, emit failure).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Boundary validation rejected an inbound request.
    #[error("invalid request: {0}")]
    Invalid(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
