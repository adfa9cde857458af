// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Redis-backed presence store shared by every worker in the fleet.
//!
//! Two key families under the configured prefix:
//! - `{prefix}:online:{uid}` -- flag marking the user reachable
//! - `{prefix}:conn:{connection_id}` -- reverse mapping to the uid
//!
//! Both are plain single-key last-writer-wins values; each user's presence
//! is independent, so no cross-key transaction is needed.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::debug;

use valet_config::model::PresenceConfig;
use valet_core::types::{AdapterType, HealthStatus};
use valet_core::{PluginAdapter, PresenceStore, ValetError};

/// Presence store over a shared Redis instance.
#[derive(Clone)]
pub struct RedisPresence {
    manager: ConnectionManager,
    prefix: String,
}

impl RedisPresence {
    /// Connects to Redis and returns a presence store handle.
    ///
    /// The connection manager reconnects transparently; individual command
    /// failures still surface as [`ValetError::PresenceCheck`] so callers
    /// can apply the assume-offline policy.
    pub async fn connect(config: &PresenceConfig) -> Result<Self, ValetError> {
        let client = redis::Client::open(config.redis_url.as_str()).map_err(map_redis_err)?;
        let manager = ConnectionManager::new(client).await.map_err(map_redis_err)?;

        debug!(url = %config.redis_url, prefix = %config.key_prefix, "presence store connected");

        Ok(Self {
            manager,
            prefix: config.key_prefix.clone(),
        })
    }

    fn online_key(&self, uid: &str) -> String {
        format!("{}:online:{uid}", self.prefix)
    }

    fn conn_key(&self, connection_id: &str) -> String {
        format!("{}:conn:{connection_id}", self.prefix)
    }
}

fn map_redis_err(err: redis::RedisError) -> ValetError {
    ValetError::PresenceCheck {
        message: err.to_string(),
    }
}

#[async_trait]
impl PluginAdapter for RedisPresence {
    fn name(&self) -> &str {
        "redis"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Presence
    }

    async fn health_check(&self) -> Result<HealthStatus, ValetError> {
        let mut conn = self.manager.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(map_redis_err)?;
        if pong == "PONG" {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded(format!("unexpected PING reply: {pong}")))
        }
    }

    async fn shutdown(&self) -> Result<(), ValetError> {
        // ConnectionManager closes with its last clone.
        Ok(())
    }
}

#[async_trait]
impl PresenceStore for RedisPresence {
    async fn mark_online(&self, uid: &str, connection_id: &str) -> Result<(), ValetError> {
        let mut conn = self.manager.clone();
        let _: () = conn
            .set(self.online_key(uid), "1")
            .await
            .map_err(map_redis_err)?;
        let _: () = conn
            .set(self.conn_key(connection_id), uid)
            .await
            .map_err(map_redis_err)?;
        debug!(uid, connection_id, "marked online");
        Ok(())
    }

    async fn mark_offline(&self, connection_id: &str) -> Result<(), ValetError> {
        let mut conn = self.manager.clone();
        let uid: Option<String> = conn
            .get(self.conn_key(connection_id))
            .await
            .map_err(map_redis_err)?;

        if let Some(uid) = &uid {
            let _: () = conn
                .del(self.online_key(uid))
                .await
                .map_err(map_redis_err)?;
        }

        // Always remove the mapping, even when the uid lookup found
        // nothing: repeated or late teardown must stay a no-op.
        let _: () = conn
            .del(self.conn_key(connection_id))
            .await
            .map_err(map_redis_err)?;

        debug!(connection_id, uid = uid.as_deref().unwrap_or("<unknown>"), "marked offline");
        Ok(())
    }

    async fn is_online(&self, uid: &str) -> Result<bool, ValetError> {
        let mut conn = self.manager.clone();
        conn.exists(self.online_key(uid))
            .await
            .map_err(map_redis_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Command-level behavior needs a live Redis; key construction is what
    // is unit-testable here. The full contract runs against MemoryPresence
    // in memory.rs.
    #[test]
    fn keys_are_namespaced_by_prefix() {
        let config = PresenceConfig {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: "staging".to_string(),
        };
        // Build the key strings without a live connection.
        let prefix = config.key_prefix;
        assert_eq!(format!("{prefix}:online:alice"), "staging:online:alice");
        assert_eq!(format!("{prefix}:conn:c-1"), "staging:conn:c-1");
    }
}
