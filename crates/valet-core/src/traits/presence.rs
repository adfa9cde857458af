// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Presence store trait: distributed "is this user reachable" state.

use async_trait::async_trait;

use crate::error::ValetError;
use crate::traits::adapter::PluginAdapter;

/// Shared presence state visible to every worker.
///
/// Any of several stateless workers may hold a user's live connection, so
/// presence must live in externally-visible shared state: a worker-local
/// map would make delivery decisions taken on a *different* worker wrong.
#[async_trait]
pub trait PresenceStore: PluginAdapter {
    /// Records `uid` as reachable and remembers the reverse mapping
    /// `connection_id` -> `uid`.
    async fn mark_online(&self, uid: &str, connection_id: &str) -> Result<(), ValetError>;

    /// Resolves `connection_id` back to its uid, clears that uid's online
    /// flag, and removes the mapping. Idempotent: a second call, or a call
    /// with an unknown connection id, is a no-op.
    async fn mark_offline(&self, connection_id: &str) -> Result<(), ValetError>;

    /// Returns true if the user currently has a live connection anywhere
    /// in the fleet.
    async fn is_online(&self, uid: &str) -> Result<bool, ValetError>;
}
