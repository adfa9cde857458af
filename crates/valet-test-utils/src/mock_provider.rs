// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock LLM provider adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with pre-scripted replies,
//! enabling fast, CI-runnable agent-loop tests without external API calls.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use valet_core::types::{
    AdapterType, HealthStatus, ProviderReply, ProviderRequest, TokenUsage, ToolCall,
};
use valet_core::{PluginAdapter, ProviderAdapter, ValetError};

/// A mock LLM provider that returns pre-scripted replies.
///
/// Replies are popped from a FIFO queue; when the queue is empty a default
/// "mock reply" text is returned. Every request is recorded for
/// inspection, so tests can assert on what the agent loop actually sent
/// (e.g. that a tool batch came back in exactly one turn).
pub struct MockProvider {
    replies: Mutex<VecDeque<ProviderReply>>,
    requests: Mutex<Vec<ProviderRequest>>,
    fail_next: Mutex<Option<String>>,
}

impl MockProvider {
    /// Create a new mock provider with an empty reply queue.
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            fail_next: Mutex::new(None),
        }
    }

    /// Create a mock provider pre-loaded with the given replies.
    pub fn with_replies(replies: Vec<ProviderReply>) -> Self {
        let provider = Self::new();
        *provider.replies.lock().unwrap() = VecDeque::from(replies);
        provider
    }

    /// Queue a terminal text reply.
    pub fn push_text(&self, text: impl Into<String>) {
        self.replies.lock().unwrap().push_back(text_reply(text));
    }

    /// Queue a reply with pending tool calls.
    pub fn push_tool_calls(&self, calls: Vec<ToolCall>) {
        self.replies.lock().unwrap().push_back(ProviderReply {
            text: String::new(),
            tool_calls: calls,
            stop_reason: None,
            usage: Some(TokenUsage {
                input_tokens: 10,
                output_tokens: 20,
            }),
        });
    }

    /// Make the next `complete` call fail as provider-unavailable.
    pub fn fail_next(&self, message: impl Into<String>) {
        *self.fail_next.lock().unwrap() = Some(message.into());
    }

    /// Every request the provider has received, in order.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// A terminal text reply with nominal usage numbers.
pub fn text_reply(text: impl Into<String>) -> ProviderReply {
    ProviderReply {
        text: text.into(),
        tool_calls: Vec::new(),
        stop_reason: Some("STOP".to_string()),
        usage: Some(TokenUsage {
            input_tokens: 10,
            output_tokens: 20,
        }),
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ValetError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ValetError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderReply, ValetError> {
        if let Some(message) = self.fail_next.lock().unwrap().take() {
            return Err(ValetError::ProviderUnavailable {
                message,
                source: None,
            });
        }

        self.requests.lock().unwrap().push(request);

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| text_reply("mock reply"));
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ProviderRequest {
        ProviderRequest {
            model: "test-model".to_string(),
            system_prompt: None,
            messages: vec![],
            tools: None,
            max_tokens: None,
        }
    }

    #[tokio::test]
    async fn default_reply_when_queue_empty() {
        let provider = MockProvider::new();
        let reply = provider.complete(request()).await.unwrap();
        assert_eq!(reply.text, "mock reply");
        assert!(reply.is_terminal());
    }

    #[tokio::test]
    async fn scripted_replies_come_back_in_order() {
        let provider = MockProvider::new();
        provider.push_text("first");
        provider.push_tool_calls(vec![ToolCall {
            name: "get_current_datetime".to_string(),
            args: serde_json::json!({}),
        }]);

        assert_eq!(provider.complete(request()).await.unwrap().text, "first");
        let second = provider.complete(request()).await.unwrap();
        assert_eq!(second.tool_calls.len(), 1);
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn fail_next_surfaces_provider_unavailable() {
        let provider = MockProvider::new();
        provider.fail_next("connection refused");
        assert!(matches!(
            provider.complete(request()).await,
            Err(ValetError::ProviderUnavailable { .. })
        ));
        // Subsequent calls succeed again.
        assert!(provider.complete(request()).await.is_ok());
    }
}
