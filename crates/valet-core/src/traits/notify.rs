// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Push notification adapter trait.

use async_trait::async_trait;

use crate::error::ValetError;
use crate::traits::adapter::PluginAdapter;

/// Fire-and-forget push notification sender.
///
/// Callers log failures and move on: by the time a notification is sent
/// the payload is already persisted in the queue, so a lost notification
/// loses nothing durable.
#[async_trait]
pub trait NotificationAdapter: PluginAdapter {
    /// Sends one notification to the device behind `token`.
    async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        metadata: serde_json::Value,
    ) -> Result<(), ValetError>;
}
