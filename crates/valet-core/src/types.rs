// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Valet pipeline.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Who a delivered message is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Assistant,
    System,
}

/// One finished message on its way to a user.
///
/// Immutable once constructed; flows from the agent loop through the
/// delivery router to either the live transport or the durable queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryPayload {
    pub message: String,
    pub kind: MessageKind,
}

impl DeliveryPayload {
    pub fn assistant(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: MessageKind::Assistant,
        }
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: MessageKind::System,
        }
    }
}

/// A structured request from the model to invoke an external capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    /// Argument map as provided by the model. Always a JSON object; an
    /// absent argument list arrives as an empty object.
    pub args: serde_json::Value,
}

/// Outcome of one tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ToolOutcome {
    /// Opaque structured data returned by the tool.
    Success(serde_json::Value),
    /// Captured failure. The dispatcher never lets a tool failure escape
    /// as an error; the model sees it as data and decides what to do.
    Error(String),
}

/// A tool invocation result, paired with the call name so a batch of
/// results can be matched back to the batch of calls that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub name: String,
    pub outcome: ToolOutcome,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            outcome: ToolOutcome::Success(value),
        }
    }

    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: ToolOutcome::Error(message.into()),
        }
    }

    /// Wire form of the outcome: `{"result": ...}` on success,
    /// `{"error": "..."}` on failure.
    pub fn response_value(&self) -> serde_json::Value {
        match &self.outcome {
            ToolOutcome::Success(value) => serde_json::json!({ "result": value }),
            ToolOutcome::Error(message) => serde_json::json!({ "error": message }),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Error(_))
    }
}

/// An opaque content blob attached to an outbound turn: a user upload or a
/// retrieved context artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// One piece of a provider message.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text { text: String },
    Blob { mime_type: String, data: Vec<u8> },
    ToolCall(ToolCall),
    ToolResult(ToolResult),
}

/// A single message in a provider conversation.
///
/// Roles follow the provider-neutral convention "user" / "model"; provider
/// adapters map them onto their own wire vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderMessage {
    pub role: String,
    pub parts: Vec<ContentPart>,
}

impl ProviderMessage {
    pub fn user(parts: Vec<ContentPart>) -> Self {
        Self {
            role: "user".to_string(),
            parts,
        }
    }

    pub fn model(parts: Vec<ContentPart>) -> Self {
        Self {
            role: "model".to_string(),
            parts,
        }
    }
}

/// A request to an LLM provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub model: String,
    pub system_prompt: Option<String>,
    pub messages: Vec<ProviderMessage>,
    /// Function declarations in the provider's schema format.
    pub tools: Option<Vec<serde_json::Value>>,
    pub max_tokens: Option<u32>,
}

/// A normalized provider reply: terminal text, pending tool calls, or both.
///
/// The reply is terminal for the current exchange iff `tool_calls` is
/// empty.
#[derive(Debug, Clone, Default)]
pub struct ProviderReply {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub stop_reason: Option<String>,
    pub usage: Option<TokenUsage>,
}

impl ProviderReply {
    pub fn is_terminal(&self) -> bool {
        self.tool_calls.is_empty()
    }
}

/// Token accounting reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a [`crate::traits::PluginAdapter`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
    Presence,
    Transport,
    Notification,
    Connector,
    Retrieval,
}
