// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fallback connectors wired when no concrete collaborator is configured.
//!
//! Every operation reports a configuration error as its result. The
//! dispatcher captures that as a tool error, so the model can tell the
//! user the capability is unavailable instead of the prompt failing.

use async_trait::async_trait;

use valet_core::types::{AdapterType, HealthStatus};
use valet_core::{CalendarConnector, PluginAdapter, TaskConnector, ValetError};

/// Calendar connector standing in until credentials are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredCalendar;

/// Task connector standing in until credentials are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredTasks;

fn not_configured(what: &str) -> ValetError {
    ValetError::Internal(format!(
        "{what} connector is not configured; set the matching [connectors] credentials"
    ))
}

#[async_trait]
impl PluginAdapter for UnconfiguredCalendar {
    fn name(&self) -> &str {
        "calendar-unconfigured"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Connector
    }

    async fn health_check(&self) -> Result<HealthStatus, ValetError> {
        Ok(HealthStatus::Degraded("no calendar credentials".to_string()))
    }

    async fn shutdown(&self) -> Result<(), ValetError> {
        Ok(())
    }
}

#[async_trait]
impl CalendarConnector for UnconfiguredCalendar {
    async fn create_event(&self, _args: serde_json::Value) -> Result<serde_json::Value, ValetError> {
        Err(not_configured("calendar"))
    }

    async fn list_events(&self, _args: serde_json::Value) -> Result<serde_json::Value, ValetError> {
        Err(not_configured("calendar"))
    }

    async fn list_calendars(&self) -> Result<serde_json::Value, ValetError> {
        Err(not_configured("calendar"))
    }

    async fn update_event(&self, _args: serde_json::Value) -> Result<serde_json::Value, ValetError> {
        Err(not_configured("calendar"))
    }

    async fn delete_event(&self, _args: serde_json::Value) -> Result<serde_json::Value, ValetError> {
        Err(not_configured("calendar"))
    }
}

#[async_trait]
impl PluginAdapter for UnconfiguredTasks {
    fn name(&self) -> &str {
        "tasks-unconfigured"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Connector
    }

    async fn health_check(&self) -> Result<HealthStatus, ValetError> {
        Ok(HealthStatus::Degraded("no task tracker credentials".to_string()))
    }

    async fn shutdown(&self) -> Result<(), ValetError> {
        Ok(())
    }
}

#[async_trait]
impl TaskConnector for UnconfiguredTasks {
    async fn add_task(&self, _args: serde_json::Value) -> Result<serde_json::Value, ValetError> {
        Err(not_configured("task tracker"))
    }

    async fn get_tasks(&self, _args: serde_json::Value) -> Result<serde_json::Value, ValetError> {
        Err(not_configured("task tracker"))
    }

    async fn update_task(&self, _args: serde_json::Value) -> Result<serde_json::Value, ValetError> {
        Err(not_configured("task tracker"))
    }

    async fn delete_task(&self, _args: serde_json::Value) -> Result<serde_json::Value, ValetError> {
        Err(not_configured("task tracker"))
    }
}
