// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Push notification adapter over an FCM-style HTTP endpoint.
//!
//! Fire-and-forget by contract: callers log failures and move on, because
//! the payload behind a notification is already persisted in the queue.
//! Web push messages are marked high urgency and carry a click-through
//! link when the metadata provides one.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use valet_core::types::{AdapterType, HealthStatus};
use valet_core::{NotificationAdapter, PluginAdapter, ValetError};

/// HTTP push notification client.
#[derive(Debug, Clone)]
pub struct PushClient {
    client: reqwest::Client,
    endpoint: String,
}

impl PushClient {
    /// Creates a push client for `endpoint`, authenticating every send
    /// with the bearer `credential`.
    pub fn new(endpoint: String, credential: String) -> Result<Self, ValetError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {credential}"))
            .map_err(|e| ValetError::Config(format!("invalid push credential: {e}")))?;
        auth.set_sensitive(true);
        headers.insert("authorization", auth);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ValetError::Delivery {
                message: format!("failed to build push HTTP client: {e}"),
            })?;

        Ok(Self { client, endpoint })
    }
}

/// Builds the wire message for one notification.
fn build_message(
    token: &str,
    title: &str,
    body: &str,
    metadata: &serde_json::Value,
) -> serde_json::Value {
    let link = metadata.get("link").and_then(|v| v.as_str());

    let mut webpush = serde_json::json!({
        "headers": { "Urgency": "high" }
    });
    if let Some(link) = link {
        webpush["fcm_options"] = serde_json::json!({ "link": link });
    }

    serde_json::json!({
        "message": {
            "token": token,
            "notification": { "title": title, "body": body },
            "webpush": webpush,
            "data": metadata,
        }
    })
}

#[async_trait]
impl PluginAdapter for PushClient {
    fn name(&self) -> &str {
        "push-http"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notification
    }

    async fn health_check(&self) -> Result<HealthStatus, ValetError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ValetError> {
        Ok(())
    }
}

#[async_trait]
impl NotificationAdapter for PushClient {
    async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        metadata: serde_json::Value,
    ) -> Result<(), ValetError> {
        let message = build_message(token, title, body, &metadata);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&message)
            .send()
            .await
            .map_err(|e| ValetError::Delivery {
                message: format!("push request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ValetError::Delivery {
                message: format!("push service returned {status}: {body}"),
            });
        }

        debug!("push notification accepted");
        Ok(())
    }
}
