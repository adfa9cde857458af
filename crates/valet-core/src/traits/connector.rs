// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Boundary traits for the calendar and task-tracker collaborators.
//!
//! The concrete HTTP clients live outside this repository. Each operation
//! takes the model-supplied argument object and returns structured data;
//! side effects are at-most-once per call, and no operation retries on
//! its own -- retry-or-not is a model-driven decision in the next turn.

use async_trait::async_trait;

use crate::error::ValetError;
use crate::traits::adapter::PluginAdapter;

/// Calendar collaborator (event CRUD plus calendar discovery).
#[async_trait]
pub trait CalendarConnector: PluginAdapter {
    async fn create_event(&self, args: serde_json::Value) -> Result<serde_json::Value, ValetError>;

    async fn list_events(&self, args: serde_json::Value) -> Result<serde_json::Value, ValetError>;

    async fn list_calendars(&self) -> Result<serde_json::Value, ValetError>;

    async fn update_event(&self, args: serde_json::Value) -> Result<serde_json::Value, ValetError>;

    async fn delete_event(&self, args: serde_json::Value) -> Result<serde_json::Value, ValetError>;
}

/// Task-tracker collaborator.
#[async_trait]
pub trait TaskConnector: PluginAdapter {
    async fn add_task(&self, args: serde_json::Value) -> Result<serde_json::Value, ValetError>;

    async fn get_tasks(&self, args: serde_json::Value) -> Result<serde_json::Value, ValetError>;

    async fn update_task(&self, args: serde_json::Value) -> Result<serde_json::Value, ValetError>;

    async fn delete_task(&self, args: serde_json::Value) -> Result<serde_json::Value, ValetError>;
}
