// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live transport trait: the real-time channel for online delivery.

use async_trait::async_trait;

use crate::error::ValetError;

/// Real-time bidirectional channel keyed by uid.
///
/// `emit` addresses every live connection a user currently holds (a user
/// may be connected from several devices). Room membership is managed by
/// the transport implementation at connect/disconnect time.
#[async_trait]
pub trait LiveTransport: Send + Sync + 'static {
    /// Pushes an event to all of the user's live connections.
    async fn emit(
        &self,
        uid: &str,
        event: &str,
        payload: &serde_json::Value,
    ) -> Result<(), ValetError>;
}
