// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and positive limits.

use crate::diagnostic::ConfigError;
use crate::model::ValetConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ValetConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let host = config.gateway.host.trim();
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if !config.presence.redis_url.starts_with("redis://")
        && !config.presence.redis_url.starts_with("rediss://")
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "presence.redis_url must start with redis:// or rediss://, got `{}`",
                config.presence.redis_url
            ),
        });
    }

    if config.limits.session_turn_ceiling == 0 {
        errors.push(ConfigError::Validation {
            message: "limits.session_turn_ceiling must be at least 1".to_string(),
        });
    }

    if config.limits.max_tool_rounds == 0 {
        errors.push(ConfigError::Validation {
            message: "limits.max_tool_rounds must be at least 1".to_string(),
        });
    }

    if config.limits.tool_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "limits.tool_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.delivery.body_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "delivery.body_limit must be at least 1".to_string(),
        });
    }

    if config.delivery.push_endpoint.is_some() && config.delivery.push_credential.is_none() {
        errors.push(ConfigError::Validation {
            message: "delivery.push_endpoint is set but delivery.push_credential is missing"
                .to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
