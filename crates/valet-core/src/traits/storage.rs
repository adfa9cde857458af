// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the durable user store and message queue.

use async_trait::async_trait;

use crate::error::ValetError;
use crate::traits::adapter::PluginAdapter;
use crate::types::DeliveryPayload;

/// Adapter for the durable store holding user records and per-user message
/// queues.
///
/// The queue contract is the heart of offline delivery: `enqueue` appends
/// to the tail, `drain` reads the whole queue and clears it atomically.
/// An enqueue racing a drain lands wholly before or wholly after it --
/// never inside, never lost.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (schema, connection).
    async fn initialize(&self) -> Result<(), ValetError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), ValetError>;

    /// Returns true if a user record exists for `uid`.
    async fn user_exists(&self, uid: &str) -> Result<bool, ValetError>;

    /// Creates a user record. Registration proper lives outside the
    /// pipeline; this is the seeding surface it leaves behind.
    async fn create_user(&self, uid: &str, username: &str) -> Result<(), ValetError>;

    /// Stores (or replaces) the user's push notification token.
    async fn set_notification_token(&self, uid: &str, token: &str) -> Result<(), ValetError>;

    /// Returns the user's push notification token, if registered.
    /// Absence is a valid state, not an error.
    async fn notification_token(&self, uid: &str) -> Result<Option<String>, ValetError>;

    /// Appends a payload to the tail of the user's queue.
    async fn enqueue(&self, uid: &str, payload: &DeliveryPayload) -> Result<(), ValetError>;

    /// Atomically reads the user's entire queue in insertion order and
    /// clears it in the same operation.
    async fn drain(&self, uid: &str) -> Result<Vec<DeliveryPayload>, ValetError>;
}
