// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gemini provider adapter for the Valet assistant backend.
//!
//! Implements [`ProviderAdapter`] over the `generateContent` REST API with
//! function calling. One `complete` call is one model turn; the reply is
//! normalized into terminal text and/or pending tool calls for the agent
//! loop.

pub mod client;
pub mod types;

use async_trait::async_trait;
use base64::Engine;
use tracing::{debug, info};

use valet_config::ValetConfig;
use valet_core::types::{
    AdapterType, ContentPart, HealthStatus, ProviderReply, ProviderRequest, TokenUsage, ToolCall,
};
use valet_core::{PluginAdapter, ProviderAdapter, ValetError};

use crate::client::GeminiClient;
use crate::types::{
    ApiPart, ApiTool, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};

/// Gemini provider implementing [`ProviderAdapter`].
///
/// API key resolution: config -> `GEMINI_API_KEY` env var -> error.
pub struct GeminiProvider {
    client: GeminiClient,
    system_prompt: String,
}

impl GeminiProvider {
    /// Creates a new Gemini provider from the given configuration.
    ///
    /// # System prompt resolution
    /// 1. `agent.system_prompt_file` if set (read from disk)
    /// 2. `agent.system_prompt` if set
    /// 3. Default persona built from `agent.name`
    pub async fn new(config: &ValetConfig) -> Result<Self, ValetError> {
        let api_key = resolve_api_key(&config.gemini.api_key)?;
        let system_prompt = load_system_prompt(
            &config.agent.name,
            &config.agent.system_prompt,
            &config.agent.system_prompt_file,
        )
        .await;

        let client = GeminiClient::new(
            api_key,
            config.gemini.base_url.clone(),
            config.gemini.api_version.clone(),
            config.gemini.model.clone(),
        )?;

        info!(model = %config.gemini.model, "Gemini provider initialized");

        Ok(Self {
            client,
            system_prompt,
        })
    }

    /// Converts a [`ProviderRequest`] into the Gemini wire request.
    fn to_generate_request(&self, request: &ProviderRequest) -> GenerateContentRequest {
        let contents = request
            .messages
            .iter()
            .map(|message| Content {
                role: Some(message.role.clone()),
                parts: message.parts.iter().map(to_api_part).collect(),
            })
            .collect();

        let tools = request.tools.as_ref().map(|declarations| {
            vec![ApiTool {
                function_declarations: declarations.clone(),
            }]
        });

        let system_text = request
            .system_prompt
            .clone()
            .unwrap_or_else(|| self.system_prompt.clone());

        GenerateContentRequest {
            system_instruction: Some(Content::system(system_text)),
            contents,
            tools,
            generation_config: request.max_tokens.map(|max| GenerationConfig {
                max_output_tokens: Some(max),
            }),
        }
    }
}

/// Maps one provider-neutral content part onto the Gemini part union.
fn to_api_part(part: &ContentPart) -> ApiPart {
    match part {
        ContentPart::Text { text } => ApiPart::text(text.clone()),
        ContentPart::Blob { mime_type, data } => ApiPart::inline_data(
            mime_type.clone(),
            base64::engine::general_purpose::STANDARD.encode(data),
        ),
        ContentPart::ToolCall(call) => ApiPart::function_call(call.name.clone(), call.args.clone()),
        ContentPart::ToolResult(result) => {
            ApiPart::function_response(result.name.clone(), result.response_value())
        }
    }
}

/// Normalizes a wire response into a [`ProviderReply`].
///
/// An empty candidate list is a provider-level failure: the loop has
/// nothing to act on and nothing to deliver.
fn reply_from_response(response: GenerateContentResponse) -> Result<ProviderReply, ValetError> {
    let usage = response.usage_metadata.map(|meta| TokenUsage {
        input_tokens: meta.prompt_token_count.unwrap_or(0),
        output_tokens: meta.candidates_token_count.unwrap_or(0),
    });

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ValetError::ProviderUnavailable {
            message: "provider returned no candidates".to_string(),
            source: None,
        })?;

    let mut text = String::new();
    let mut tool_calls = Vec::new();

    if let Some(content) = candidate.content {
        for part in content.parts {
            if let Some(t) = part.text {
                text.push_str(&t);
            }
            if let Some(call) = part.function_call {
                tool_calls.push(ToolCall {
                    name: call.name,
                    args: call.args.unwrap_or_else(|| serde_json::json!({})),
                });
            }
        }
    }

    Ok(ProviderReply {
        text,
        tool_calls,
        stop_reason: candidate.finish_reason,
        usage,
    })
}

/// Resolves the API key from config or the `GEMINI_API_KEY` environment
/// variable.
fn resolve_api_key(configured: &Option<String>) -> Result<String, ValetError> {
    if let Some(key) = configured {
        if !key.is_empty() {
            return Ok(key.clone());
        }
    }
    match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(ValetError::ProviderUnavailable {
            message: "Gemini API key not configured (set gemini.api_key or GEMINI_API_KEY)"
                .to_string(),
            source: None,
        }),
    }
}

/// Loads the system prompt from file, inline config, or the default
/// persona.
async fn load_system_prompt(
    name: &str,
    inline: &Option<String>,
    file: &Option<String>,
) -> String {
    if let Some(path) = file {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => return content,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "failed to read system prompt file, falling back");
            }
        }
    }
    if let Some(prompt) = inline {
        return prompt.clone();
    }
    format!(
        "You are {name}, a dedicated personal assistant managing the user's \
         schedule and tasks. Always check the current date and time with your \
         tools before making scheduling decisions, check for conflicts before \
         creating events, and ask for explicit confirmation before updating \
         or deleting anything. Be concise."
    )
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ValetError> {
        // Avoid consuming quota on health checks; a constructable client
        // with a resolved key is considered healthy.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ValetError> {
        debug!("Gemini provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for GeminiProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderReply, ValetError> {
        let api_request = self.to_generate_request(&request);
        let response = self.client.generate(&request.model, &api_request).await?;
        reply_from_response(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use valet_core::types::{ProviderMessage, ToolResult};

    fn provider_with_key() -> GeminiProvider {
        let client = GeminiClient::new(
            "test-key".to_string(),
            "https://example.com".to_string(),
            "v1beta".to_string(),
            "gemini-2.5-flash".to_string(),
        )
        .unwrap();
        GeminiProvider {
            client,
            system_prompt: "default prompt".to_string(),
        }
    }

    #[test]
    fn request_conversion_maps_all_part_kinds() {
        let provider = provider_with_key();
        let request = ProviderRequest {
            model: "gemini-2.5-flash".to_string(),
            system_prompt: None,
            messages: vec![
                ProviderMessage::user(vec![
                    ContentPart::Text {
                        text: "schedule lunch".to_string(),
                    },
                    ContentPart::Blob {
                        mime_type: "application/pdf".to_string(),
                        data: vec![1, 2, 3],
                    },
                ]),
                ProviderMessage::model(vec![ContentPart::ToolCall(ToolCall {
                    name: "gcal_create_event".to_string(),
                    args: serde_json::json!({"summary": "lunch"}),
                })]),
                ProviderMessage::user(vec![ContentPart::ToolResult(ToolResult::success(
                    "gcal_create_event",
                    serde_json::json!({"id": "evt-1"}),
                ))]),
            ],
            tools: Some(vec![serde_json::json!({"name": "gcal_create_event"})]),
            max_tokens: Some(1024),
        };

        let wire = provider.to_generate_request(&request);

        assert_eq!(wire.contents.len(), 3);
        assert_eq!(wire.contents[0].parts[0].text.as_deref(), Some("schedule lunch"));
        // Blob is base64-encoded inline data.
        assert_eq!(
            wire.contents[0].parts[1].inline_data.as_ref().unwrap().data,
            base64::engine::general_purpose::STANDARD.encode([1u8, 2, 3])
        );
        assert_eq!(
            wire.contents[1].parts[0]
                .function_call
                .as_ref()
                .unwrap()
                .name,
            "gcal_create_event"
        );
        assert_eq!(
            wire.contents[2].parts[0]
                .function_response
                .as_ref()
                .unwrap()
                .response,
            serde_json::json!({"result": {"id": "evt-1"}})
        );
        assert_eq!(wire.tools.as_ref().unwrap()[0].function_declarations.len(), 1);
        assert_eq!(
            wire.generation_config.as_ref().unwrap().max_output_tokens,
            Some(1024)
        );
        // Falls back to the provider's default system prompt.
        assert_eq!(
            wire.system_instruction.as_ref().unwrap().parts[0]
                .text
                .as_deref(),
            Some("default prompt")
        );
    }

    #[test]
    fn reply_normalization_splits_text_and_tool_calls() {
        let body = r#"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Checking your calendar."},
                        {"functionCall": {"name": "gcal_list_events", "args": {"query": "lunch"}}},
                        {"functionCall": {"name": "get_current_datetime"}}
                    ]
                },
                "finishReason": "STOP"
            }]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let reply = reply_from_response(response).unwrap();

        assert_eq!(reply.text, "Checking your calendar.");
        assert_eq!(reply.tool_calls.len(), 2);
        assert!(!reply.is_terminal());
        // Missing args become an empty object, never null.
        assert_eq!(reply.tool_calls[1].args, serde_json::json!({}));
        assert_eq!(reply.stop_reason.as_deref(), Some("STOP"));
    }

    #[test]
    fn reply_without_candidates_is_provider_failure() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            reply_from_response(response),
            Err(ValetError::ProviderUnavailable { .. })
        ));
    }

    #[test]
    #[serial]
    fn api_key_resolution_prefers_config() {
        // SAFETY: serialized by #[serial]; no other thread reads the env here.
        unsafe { std::env::set_var("GEMINI_API_KEY", "from-env") };
        let key = resolve_api_key(&Some("from-config".to_string())).unwrap();
        unsafe { std::env::remove_var("GEMINI_API_KEY") };
        assert_eq!(key, "from-config");
    }

    #[test]
    #[serial]
    fn api_key_resolution_falls_back_to_env_then_errors() {
        unsafe { std::env::set_var("GEMINI_API_KEY", "from-env") };
        assert_eq!(resolve_api_key(&None).unwrap(), "from-env");
        unsafe { std::env::remove_var("GEMINI_API_KEY") };
        assert!(matches!(
            resolve_api_key(&None),
            Err(ValetError::ProviderUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn default_system_prompt_carries_agent_name() {
        let prompt = load_system_prompt("steve", &None, &None).await;
        assert!(prompt.contains("You are steve"));

        let inline = load_system_prompt("steve", &Some("custom".to_string()), &None).await;
        assert_eq!(inline, "custom");
    }
}
