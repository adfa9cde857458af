// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini generateContent API.
//!
//! No automatic retries: a provider failure is fatal to the current
//! prompt and is reported upward as `ProviderUnavailable`.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;
use valet_core::ValetError;

use crate::types::{ApiErrorResponse, GenerateContentRequest, GenerateContentResponse};

/// HTTP client for Gemini API communication.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_version: String,
    default_model: String,
}

impl GeminiClient {
    /// Creates a new Gemini API client.
    ///
    /// # Arguments
    /// * `api_key` - Gemini API key, sent as the `x-goog-api-key` header
    /// * `base_url` - API origin (overridable for tests and proxies)
    /// * `api_version` - version path segment (e.g. "v1beta")
    /// * `model` - default model identifier
    pub fn new(
        api_key: String,
        base_url: String,
        api_version: String,
        model: String,
    ) -> Result<Self, ValetError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&api_key)
                .map_err(|e| ValetError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| ValetError::ProviderUnavailable {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version,
            default_model: model,
        })
    }

    /// Returns the default model identifier.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Sends one generateContent request and returns the parsed response.
    pub async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ValetError> {
        let url = format!(
            "{}/{}/models/{model}:generateContent",
            self.base_url, self.api_version
        );

        let response = self.client.post(&url).json(request).send().await.map_err(
            |e| ValetError::ProviderUnavailable {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            },
        )?;

        let status = response.status();
        debug!(status = %status, model, "generateContent response received");

        let body = response
            .text()
            .await
            .map_err(|e| ValetError::ProviderUnavailable {
                message: format!("failed to read response body: {e}"),
                source: Some(Box::new(e)),
            })?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "Gemini API error ({}): {}",
                    api_err.error.status, api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(ValetError::ProviderUnavailable {
                message,
                source: None,
            });
        }

        serde_json::from_str(&body).map_err(|e| ValetError::ProviderUnavailable {
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}
