// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process presence store for tests and single-worker deployments.
//!
//! Implements the same contract as the Redis store over two DashMaps.
//! Not suitable for a multi-worker fleet: presence decisions made by a
//! different worker would not see this process's map.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use valet_core::types::{AdapterType, HealthStatus};
use valet_core::{PluginAdapter, PresenceStore, ValetError};

/// DashMap-backed presence store.
#[derive(Default)]
pub struct MemoryPresence {
    /// uids currently flagged online.
    online: DashMap<String, ()>,
    /// connection_id -> uid reverse mapping.
    connections: DashMap<String, String>,
}

impl MemoryPresence {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PluginAdapter for MemoryPresence {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Presence
    }

    async fn health_check(&self) -> Result<HealthStatus, ValetError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ValetError> {
        self.online.clear();
        self.connections.clear();
        Ok(())
    }
}

#[async_trait]
impl PresenceStore for MemoryPresence {
    async fn mark_online(&self, uid: &str, connection_id: &str) -> Result<(), ValetError> {
        self.online.insert(uid.to_string(), ());
        self.connections
            .insert(connection_id.to_string(), uid.to_string());
        debug!(uid, connection_id, "marked online");
        Ok(())
    }

    async fn mark_offline(&self, connection_id: &str) -> Result<(), ValetError> {
        if let Some((_, uid)) = self.connections.remove(connection_id) {
            self.online.remove(&uid);
        }
        Ok(())
    }

    async fn is_online(&self, uid: &str) -> Result<bool, ValetError> {
        Ok(self.online.contains_key(uid))
    }
}
