// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Task-tracker tool handlers delegating to the [`TaskConnector`] boundary.

use std::sync::Arc;

use async_trait::async_trait;

use valet_core::{TaskConnector, ValetError};

use crate::{ToolHandler, declarations};

/// The task-tracker operations exposed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOp {
    AddTask,
    GetTasks,
    UpdateTask,
    DeleteTask,
}

/// One task tool: an operation bound to a connector.
pub struct TaskTool {
    op: TaskOp,
    connector: Arc<dyn TaskConnector>,
}

impl TaskTool {
    pub fn new(op: TaskOp, connector: Arc<dyn TaskConnector>) -> Self {
        Self { op, connector }
    }

    /// All task tools over one connector, in declaration order.
    pub fn all(connector: Arc<dyn TaskConnector>) -> Vec<Arc<dyn ToolHandler>> {
        [
            TaskOp::AddTask,
            TaskOp::GetTasks,
            TaskOp::UpdateTask,
            TaskOp::DeleteTask,
        ]
        .into_iter()
        .map(|op| Arc::new(Self::new(op, connector.clone())) as Arc<dyn ToolHandler>)
        .collect()
    }
}

#[async_trait]
impl ToolHandler for TaskTool {
    fn name(&self) -> &'static str {
        match self.op {
            TaskOp::AddTask => "todoist_add_task",
            TaskOp::GetTasks => "todoist_get_tasks",
            TaskOp::UpdateTask => "todoist_update_task",
            TaskOp::DeleteTask => "todoist_delete_task",
        }
    }

    fn declaration(&self) -> serde_json::Value {
        declarations::by_name(self.name())
    }

    async fn invoke(&self, args: serde_json::Value) -> Result<serde_json::Value, ValetError> {
        match self.op {
            TaskOp::AddTask => self.connector.add_task(args).await,
            TaskOp::GetTasks => self.connector.get_tasks(args).await,
            TaskOp::UpdateTask => self.connector.update_task(args).await,
            TaskOp::DeleteTask => self.connector.delete_task(args).await,
        }
    }
}
