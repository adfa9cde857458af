// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Valet assistant backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Valet configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ValetConfig {
    /// Assistant identity and behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Gemini API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Presence store settings.
    #[serde(default)]
    pub presence: PresenceConfig,

    /// Gateway (WebSocket/HTTP) settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Delivery and push-notification settings.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Pipeline limits: session ceiling, tool loop bounds, timeouts.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// External collaborator credentials (calendar, task tracker).
    #[serde(default)]
    pub connectors: ConnectorsConfig,
}

/// Assistant identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant. Also the default notification title.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline system prompt string. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a file containing the system prompt.
    /// Takes precedence over `system_prompt` if both are set.
    #[serde(default)]
    pub system_prompt_file: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
            system_prompt_file: None,
        }
    }
}

fn default_agent_name() -> String {
    "valet".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Gemini API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// Gemini API key. `None` requires the `GEMINI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Default model for LLM requests.
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL. Overridable for tests and proxies.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API version path segment.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            api_version: default_api_version(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_api_version() -> String {
    "v1beta".to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "valet.db".to_string()
}

/// Presence store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PresenceConfig {
    /// Redis connection URL shared by every worker.
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Key namespace prefix, so several deployments can share one Redis.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            redis_url: default_redis_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_key_prefix() -> String {
    "valet".to_string()
}

/// Gateway server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8080
}

/// Delivery and push-notification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Notification title. Falls back to `agent.name` when unset.
    #[serde(default)]
    pub notification_title: Option<String>,

    /// Maximum character length of a notification body before truncation.
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,

    /// Click-through link attached to web push notifications.
    #[serde(default)]
    pub link: Option<String>,

    /// Application identifier forwarded in notification metadata.
    #[serde(default)]
    pub app_identifier: Option<String>,

    /// Push service endpoint URL. `None` disables notifications.
    #[serde(default)]
    pub push_endpoint: Option<String>,

    /// Bearer credential for the push service.
    #[serde(default)]
    pub push_credential: Option<String>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            notification_title: None,
            body_limit: default_body_limit(),
            link: None,
            app_identifier: None,
            push_endpoint: None,
            push_credential: None,
        }
    }
}

fn default_body_limit() -> usize {
    120
}

/// Pipeline limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// User-visible turns before a conversation session is discarded and
    /// restarted cold. Bounds unbounded context growth.
    #[serde(default = "default_session_turn_ceiling")]
    pub session_turn_ceiling: u32,

    /// Maximum tool-call round trips within a single prompt before the
    /// loop is aborted.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,

    /// Per-tool-invocation timeout in seconds. A tool that exceeds it is
    /// reported to the model as a timeout error result.
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            session_turn_ceiling: default_session_turn_ceiling(),
            max_tool_rounds: default_max_tool_rounds(),
            tool_timeout_secs: default_tool_timeout_secs(),
        }
    }
}

fn default_session_turn_ceiling() -> u32 {
    300
}

fn default_max_tool_rounds() -> u32 {
    8
}

fn default_tool_timeout_secs() -> u64 {
    30
}

/// External collaborator credentials.
///
/// The concrete calendar/task-tracker clients live outside this
/// repository; these keys exist so deployments can hand them through.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectorsConfig {
    /// Task tracker API token.
    #[serde(default)]
    pub todoist_api_key: Option<String>,

    /// Path to calendar OAuth credentials.
    #[serde(default)]
    pub calendar_credentials_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = ValetConfig::default();
        assert_eq!(config.agent.name, "valet");
        assert_eq!(config.agent.log_level, "info");
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.storage.database_path, "valet.db");
        assert_eq!(config.limits.session_turn_ceiling, 300);
        assert_eq!(config.limits.max_tool_rounds, 8);
        assert_eq!(config.limits.tool_timeout_secs, 30);
        assert_eq!(config.delivery.body_limit, 120);
        assert!(config.delivery.push_endpoint.is_none());
    }

    #[test]
    fn minimal_toml_deserializes_with_defaults() {
        let toml_str = r#"
[agent]
name = "steve"
"#;
        let config: ValetConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.agent.name, "steve");
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.presence.key_prefix, "valet");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml_str = r#"
[agent]
naem = "typo"
"#;
        assert!(toml::from_str::<ValetConfig>(toml_str).is_err());
    }

    #[test]
    fn limits_section_overrides() {
        let toml_str = r#"
[limits]
session_turn_ceiling = 10
max_tool_rounds = 3
"#;
        let config: ValetConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.limits.session_turn_ceiling, 10);
        assert_eq!(config.limits.max_tool_rounds, 3);
        // Untouched field keeps its default.
        assert_eq!(config.limits.tool_timeout_secs, 30);
    }
}
