// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Calendar tool handlers delegating to the [`CalendarConnector`] boundary.

use std::sync::Arc;

use async_trait::async_trait;

use valet_core::{CalendarConnector, ValetError};

use crate::{ToolHandler, declarations};

/// The calendar operations exposed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarOp {
    CreateEvent,
    ListEvents,
    ListCalendars,
    UpdateEvent,
    DeleteEvent,
}

/// One calendar tool: an operation bound to a connector.
pub struct CalendarTool {
    op: CalendarOp,
    connector: Arc<dyn CalendarConnector>,
}

impl CalendarTool {
    pub fn new(op: CalendarOp, connector: Arc<dyn CalendarConnector>) -> Self {
        Self { op, connector }
    }

    /// All calendar tools over one connector, in declaration order.
    pub fn all(connector: Arc<dyn CalendarConnector>) -> Vec<Arc<dyn ToolHandler>> {
        [
            CalendarOp::CreateEvent,
            CalendarOp::ListEvents,
            CalendarOp::ListCalendars,
            CalendarOp::UpdateEvent,
            CalendarOp::DeleteEvent,
        ]
        .into_iter()
        .map(|op| Arc::new(Self::new(op, connector.clone())) as Arc<dyn ToolHandler>)
        .collect()
    }
}

#[async_trait]
impl ToolHandler for CalendarTool {
    fn name(&self) -> &'static str {
        match self.op {
            CalendarOp::CreateEvent => "gcal_create_event",
            CalendarOp::ListEvents => "gcal_list_events",
            CalendarOp::ListCalendars => "gcal_list_calendars",
            CalendarOp::UpdateEvent => "gcal_update_event",
            CalendarOp::DeleteEvent => "gcal_delete_event",
        }
    }

    fn declaration(&self) -> serde_json::Value {
        declarations::by_name(self.name())
    }

    async fn invoke(&self, args: serde_json::Value) -> Result<serde_json::Value, ValetError> {
        match self.op {
            CalendarOp::CreateEvent => self.connector.create_event(args).await,
            CalendarOp::ListEvents => self.connector.list_events(args).await,
            CalendarOp::ListCalendars => self.connector.list_calendars().await,
            CalendarOp::UpdateEvent => self.connector.update_event(args).await,
            CalendarOp::DeleteEvent => self.connector.delete_event(args).await,
        }
    }
}
