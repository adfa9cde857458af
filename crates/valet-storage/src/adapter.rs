// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use valet_config::model::StorageConfig;
use valet_core::types::{AdapterType, DeliveryPayload, HealthStatus};
use valet_core::{PluginAdapter, StorageAdapter, ValetError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not
    /// initialized.
    fn db(&self) -> Result<&Database, ValetError> {
        self.db.get().ok_or_else(|| ValetError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ValetError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ValetError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("storage shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), ValetError> {
        let db = Database::open(&self.config.database_path).await?;
        self.db.set(db).map_err(|_| ValetError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ValetError> {
        self.db()?.close().await
    }

    async fn user_exists(&self, uid: &str) -> Result<bool, ValetError> {
        queries::users::user_exists(self.db()?, uid).await
    }

    async fn create_user(&self, uid: &str, username: &str) -> Result<(), ValetError> {
        queries::users::create_user(self.db()?, uid, username).await
    }

    async fn set_notification_token(&self, uid: &str, token: &str) -> Result<(), ValetError> {
        queries::users::set_notification_token(self.db()?, uid, token).await
    }

    async fn notification_token(&self, uid: &str) -> Result<Option<String>, ValetError> {
        queries::users::notification_token(self.db()?, uid).await
    }

    async fn enqueue(&self, uid: &str, payload: &DeliveryPayload) -> Result<(), ValetError> {
        queries::queue::enqueue(self.db()?, uid, payload).await?;
        Ok(())
    }

    async fn drain(&self, uid: &str) -> Result<Vec<DeliveryPayload>, ValetError> {
        queries::queue::drain(self.db()?, uid).await
    }
}
