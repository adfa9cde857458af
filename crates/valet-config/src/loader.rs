// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./valet.toml` > `~/.config/valet/valet.toml` >
//! `/etc/valet/valet.toml` with environment variable overrides via the
//! `VALET_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ValetConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/valet/valet.toml` (system-wide)
/// 3. `~/.config/valet/valet.toml` (user XDG config)
/// 4. `./valet.toml` (local directory)
/// 5. `VALET_*` environment variables
pub fn load_config() -> Result<ValetConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ValetConfig::default()))
        .merge(Toml::file("/etc/valet/valet.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("valet/valet.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("valet.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ValetConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ValetConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ValetConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ValetConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `VALET_GEMINI_API_KEY` must map to
/// `gemini.api_key`, not `gemini.api.key`.
fn env_provider() -> Env {
    Env::prefixed("VALET_").map(|key| {
        // `key` is the lowercased env var name with the prefix stripped,
        // e.g. VALET_GEMINI_API_KEY -> "gemini_api_key".
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("gemini_", "gemini.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("presence_", "presence.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("delivery_", "delivery.", 1)
            .replacen("limits_", "limits.", 1)
            .replacen("connectors_", "connectors.", 1);
        mapped.into()
    })
}
