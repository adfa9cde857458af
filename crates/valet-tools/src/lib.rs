// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool system for the Valet agent loop.
//!
//! Tools are the model-invocable surface over the external collaborators
//! (calendar, task tracker) plus built-ins like the clock. Each tool
//! declares a schema for the provider's function-calling interface and is
//! registered in a [`ToolDispatcher`] that normalizes every outcome --
//! success, handler failure, timeout, unknown name -- into a
//! [`ToolResult`] the model can react to. Dispatch never aborts the
//! enclosing agent loop.

pub mod calendar;
pub mod clock;
pub mod connectors;
pub mod declarations;
pub mod tasks;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use valet_core::{ToolCall, ToolResult, ValetError};

pub use calendar::{CalendarOp, CalendarTool};
pub use clock::ClockTool;
pub use connectors::{UnconfiguredCalendar, UnconfiguredTasks};
pub use tasks::{TaskOp, TaskTool};

/// A single invocable tool.
#[async_trait]
pub trait ToolHandler: Send + Sync + 'static {
    /// Registry key; must match the declaration's `name` field.
    fn name(&self) -> &'static str;

    /// Function declaration in the provider's schema format.
    fn declaration(&self) -> serde_json::Value;

    /// Executes the tool. Side effects are at-most-once per call; the
    /// handler must not retry on its own.
    async fn invoke(&self, args: serde_json::Value) -> Result<serde_json::Value, ValetError>;
}

/// Static registry mapping tool names to handlers, with uniform outcome
/// normalization and a per-invocation timeout.
pub struct ToolDispatcher {
    handlers: HashMap<&'static str, Arc<dyn ToolHandler>>,
    timeout: Duration,
}

impl ToolDispatcher {
    /// Creates an empty dispatcher with the given per-call timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            handlers: HashMap::new(),
            timeout,
        }
    }

    /// Registers a handler. A later registration under the same name
    /// replaces the earlier one.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        self.handlers.insert(handler.name(), handler);
    }

    /// Registers a batch of handlers.
    pub fn register_all(&mut self, handlers: impl IntoIterator<Item = Arc<dyn ToolHandler>>) {
        for handler in handlers {
            self.register(handler);
        }
    }

    /// Function declarations for every registered tool.
    pub fn declarations(&self) -> Vec<serde_json::Value> {
        let mut declarations: Vec<_> =
            self.handlers.values().map(|h| h.declaration()).collect();
        // Deterministic order for request caching and tests.
        declarations.sort_by(|a, b| {
            a["name"]
                .as_str()
                .unwrap_or_default()
                .cmp(b["name"].as_str().unwrap_or_default())
        });
        declarations
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Executes one tool call and normalizes the outcome.
    ///
    /// An unknown name, a handler error, and a timeout all come back as
    /// error results -- never as errors that escape to the caller.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        let Some(handler) = self.handlers.get(call.name.as_str()) else {
            warn!(tool = %call.name, "unknown tool requested by model");
            return ToolResult::error(&call.name, format!("unknown tool: {}", call.name));
        };

        debug!(tool = %call.name, "executing tool");

        match tokio::time::timeout(self.timeout, handler.invoke(call.args.clone())).await {
            Ok(Ok(value)) => ToolResult::success(&call.name, value),
            Ok(Err(e)) => {
                warn!(tool = %call.name, error = %e, "tool execution failed");
                ToolResult::error(&call.name, e.to_string())
            }
            Err(_) => {
                warn!(tool = %call.name, timeout = ?self.timeout, "tool invocation timed out");
                ToolResult::error(
                    &call.name,
                    format!("tool timed out after {:?}", self.timeout),
                )
            }
        }
    }

    /// Executes every call in a batch, in order, returning one result per
    /// call. The protocol requires the whole batch answered in one reply
    /// turn, so partial results are never returned.
    pub async fn dispatch_batch(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            results.push(self.dispatch(call).await);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valet_test_utils::{MockCalendar, MockTasks};

    struct SlowTool;

    #[async_trait]
    impl ToolHandler for SlowTool {
        fn name(&self) -> &'static str {
            "slow_tool"
        }

        fn declaration(&self) -> serde_json::Value {
            serde_json::json!({"name": "slow_tool", "parameters": {"type": "OBJECT", "properties": {}}})
        }

        async fn invoke(&self, _args: serde_json::Value) -> Result<serde_json::Value, ValetError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(serde_json::json!({"done": true}))
        }
    }

    fn full_dispatcher() -> ToolDispatcher {
        let mut dispatcher = ToolDispatcher::new(Duration::from_secs(5));
        dispatcher.register_all(CalendarTool::all(Arc::new(MockCalendar::new())));
        dispatcher.register_all(TaskTool::all(Arc::new(MockTasks::new())));
        dispatcher.register(Arc::new(ClockTool));
        dispatcher
    }

    #[tokio::test]
    async fn registers_the_full_tool_surface() {
        let dispatcher = full_dispatcher();
        assert_eq!(dispatcher.len(), declarations::TOOL_NAMES.len());

        let declared: Vec<String> = dispatcher
            .declarations()
            .iter()
            .map(|d| d["name"].as_str().unwrap().to_string())
            .collect();
        for name in declarations::TOOL_NAMES {
            assert!(
                declared.iter().any(|d| d == name),
                "missing declaration for {name}"
            );
        }
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error_result_not_a_failure() {
        let dispatcher = full_dispatcher();
        let result = dispatcher
            .dispatch(&ToolCall {
                name: "summon_dragon".to_string(),
                args: serde_json::json!({}),
            })
            .await;
        assert!(result.is_error());
        assert_eq!(
            result.response_value(),
            serde_json::json!({"error": "unknown tool: summon_dragon"})
        );
    }

    #[tokio::test]
    async fn connector_failure_is_captured_as_tool_error() {
        let calendar = Arc::new(MockCalendar::new());
        calendar.fail_next("calendar API rejected the request");

        let mut dispatcher = ToolDispatcher::new(Duration::from_secs(5));
        dispatcher.register_all(CalendarTool::all(calendar));

        let result = dispatcher
            .dispatch(&ToolCall {
                name: "gcal_list_events".to_string(),
                args: serde_json::json!({"query": "standup"}),
            })
            .await;
        assert!(result.is_error());
    }

    #[tokio::test]
    async fn timeout_surfaces_as_tool_error() {
        let mut dispatcher = ToolDispatcher::new(Duration::from_millis(20));
        dispatcher.register(Arc::new(SlowTool));

        let result = dispatcher
            .dispatch(&ToolCall {
                name: "slow_tool".to_string(),
                args: serde_json::json!({}),
            })
            .await;
        assert!(result.is_error());
        match &result.outcome {
            valet_core::types::ToolOutcome::Error(message) => {
                assert!(message.contains("timed out"));
            }
            other => panic!("expected timeout error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn batch_results_preserve_call_order() {
        let dispatcher = full_dispatcher();
        let calls = vec![
            ToolCall {
                name: "get_current_datetime".to_string(),
                args: serde_json::json!({}),
            },
            ToolCall {
                name: "no_such_tool".to_string(),
                args: serde_json::json!({}),
            },
            ToolCall {
                name: "todoist_get_tasks".to_string(),
                args: serde_json::json!({"filter_str": "today"}),
            },
        ];

        let results = dispatcher.dispatch_batch(&calls).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].name, "get_current_datetime");
        assert!(!results[0].is_error());
        assert_eq!(results[1].name, "no_such_tool");
        assert!(results[1].is_error());
        assert_eq!(results[2].name, "todoist_get_tasks");
        assert!(!results[2].is_error());
    }

    #[tokio::test]
    async fn connector_side_effects_run_at_most_once_per_dispatch() {
        let tasks = Arc::new(MockTasks::new());
        let mut dispatcher = ToolDispatcher::new(Duration::from_secs(5));
        dispatcher.register_all(TaskTool::all(tasks.clone()));

        dispatcher
            .dispatch(&ToolCall {
                name: "todoist_add_task".to_string(),
                args: serde_json::json!({"content": "buy milk"}),
            })
            .await;

        assert_eq!(tasks.calls().len(), 1);
    }
}
