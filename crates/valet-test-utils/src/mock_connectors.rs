// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording calendar/task connectors for tool and agent tests.

use std::sync::Mutex;

use async_trait::async_trait;

use valet_core::types::{AdapterType, HealthStatus};
use valet_core::{CalendarConnector, PluginAdapter, TaskConnector, ValetError};

/// Recording calendar connector. Returns canned success payloads and can
/// be armed to fail its next operation.
#[derive(Default)]
pub struct MockCalendar {
    calls: Mutex<Vec<(String, serde_json::Value)>>,
    fail_next: Mutex<Option<String>>,
}

impl MockCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the connector to fail its next operation with `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        *self.fail_next.lock().unwrap() = Some(message.into());
    }

    /// Every `(operation, args)` pair recorded so far.
    pub fn calls(&self) -> Vec<(String, serde_json::Value)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str, args: &serde_json::Value) -> Result<(), ValetError> {
        if let Some(message) = self.fail_next.lock().unwrap().take() {
            return Err(ValetError::Internal(message));
        }
        self.calls
            .lock()
            .unwrap()
            .push((op.to_string(), args.clone()));
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for MockCalendar {
    fn name(&self) -> &str {
        "mock-calendar"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Connector
    }

    async fn health_check(&self) -> Result<HealthStatus, ValetError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ValetError> {
        Ok(())
    }
}

#[async_trait]
impl CalendarConnector for MockCalendar {
    async fn create_event(&self, args: serde_json::Value) -> Result<serde_json::Value, ValetError> {
        self.record("create_event", &args)?;
        Ok(serde_json::json!({"id": "evt-1", "status": "confirmed"}))
    }

    async fn list_events(&self, args: serde_json::Value) -> Result<serde_json::Value, ValetError> {
        self.record("list_events", &args)?;
        Ok(serde_json::json!({"events": []}))
    }

    async fn list_calendars(&self) -> Result<serde_json::Value, ValetError> {
        self.record("list_calendars", &serde_json::json!({}))?;
        Ok(serde_json::json!({"calendars": [{"id": "primary", "summary": "Primary"}]}))
    }

    async fn update_event(&self, args: serde_json::Value) -> Result<serde_json::Value, ValetError> {
        self.record("update_event", &args)?;
        Ok(serde_json::json!({"id": "evt-1", "status": "updated"}))
    }

    async fn delete_event(&self, args: serde_json::Value) -> Result<serde_json::Value, ValetError> {
        self.record("delete_event", &args)?;
        Ok(serde_json::json!({"status": "deleted"}))
    }
}

/// Recording task connector mirroring [`MockCalendar`].
#[derive(Default)]
pub struct MockTasks {
    calls: Mutex<Vec<(String, serde_json::Value)>>,
    fail_next: Mutex<Option<String>>,
}

impl MockTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, message: impl Into<String>) {
        *self.fail_next.lock().unwrap() = Some(message.into());
    }

    pub fn calls(&self) -> Vec<(String, serde_json::Value)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str, args: &serde_json::Value) -> Result<(), ValetError> {
        if let Some(message) = self.fail_next.lock().unwrap().take() {
            return Err(ValetError::Internal(message));
        }
        self.calls
            .lock()
            .unwrap()
            .push((op.to_string(), args.clone()));
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for MockTasks {
    fn name(&self) -> &str {
        "mock-tasks"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Connector
    }

    async fn health_check(&self) -> Result<HealthStatus, ValetError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ValetError> {
        Ok(())
    }
}

#[async_trait]
impl TaskConnector for MockTasks {
    async fn add_task(&self, args: serde_json::Value) -> Result<serde_json::Value, ValetError> {
        self.record("add_task", &args)?;
        Ok(serde_json::json!({"id": "task-1", "status": "created"}))
    }

    async fn get_tasks(&self, args: serde_json::Value) -> Result<serde_json::Value, ValetError> {
        self.record("get_tasks", &args)?;
        Ok(serde_json::json!({"tasks": []}))
    }

    async fn update_task(&self, args: serde_json::Value) -> Result<serde_json::Value, ValetError> {
        self.record("update_task", &args)?;
        Ok(serde_json::json!({"id": "task-1", "status": "updated"}))
    }

    async fn delete_task(&self, args: serde_json::Value) -> Result<serde_json::Value, ValetError> {
        self.record("delete_task", &args)?;
        Ok(serde_json::json!({"status": "deleted"}))
    }
}
