// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in clock tool: the model must never guess "now".

use async_trait::async_trait;
use chrono::{Local, SecondsFormat};

use valet_core::ValetError;

use crate::{ToolHandler, declarations};

/// Returns the current local date and time in ISO format.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockTool;

#[async_trait]
impl ToolHandler for ClockTool {
    fn name(&self) -> &'static str {
        "get_current_datetime"
    }

    fn declaration(&self) -> serde_json::Value {
        declarations::by_name(self.name())
    }

    async fn invoke(&self, _args: serde_json::Value) -> Result<serde_json::Value, ValetError> {
        Ok(serde_json::json!({
            "current_datetime": Local::now().to_rfc3339_opts(SecondsFormat::Secs, true)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clock_returns_iso_datetime() {
        let result = ClockTool.invoke(serde_json::json!({})).await.unwrap();
        let value = result["current_datetime"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(value).is_ok());
    }
}
