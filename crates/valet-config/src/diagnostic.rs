// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge.
//!
//! Converts Figment deserialization errors into miette diagnostics so
//! startup failures print actionable messages instead of a serde trace.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error with diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(valet::config::unknown_key),
        help("valid keys for this section: {valid_keys}")
    )]
    UnknownKey {
        /// The unrecognized key name.
        key: String,
        /// List of valid keys for the section.
        valid_keys: String,
    },

    /// A required configuration key is missing.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(valet::config::missing_key),
        help("add `{key} = <value>` to your valet.toml")
    )]
    MissingKey {
        /// The missing key name.
        key: String,
    },

    /// A validation error for a config value.
    #[error("validation error: {message}")]
    #[diagnostic(code(valet::config::validation))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(valet::config::other))]
    Other(String),
}

/// Convert a `figment::Error` into a list of `ConfigError` diagnostics.
///
/// A figment error may aggregate several underlying failures; each is
/// mapped to its own diagnostic.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    use figment::error::Kind;

    let mut errors = Vec::new();

    for error in err {
        let config_error = match &error.kind {
            Kind::UnknownField(field, expected) => ConfigError::UnknownKey {
                key: qualified_key(&error.path, field),
                valid_keys: expected.join(", "),
            },
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: qualified_key(&error.path, field),
            },
            other => ConfigError::Other(other.to_string()),
        };
        errors.push(config_error);
    }

    if errors.is_empty() {
        errors.push(ConfigError::Other("unknown configuration error".to_string()));
    }

    errors
}

/// Prefix a field name with its section path, e.g. `gemini.api_key`.
fn qualified_key(path: &[String], field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{}.{field}", path.join("."))
    }
}

/// Render a list of configuration errors to stderr via miette's fancy
/// report handler.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        let report = miette::Report::msg(error.to_string());
        eprintln!("{report:?}");
        if let Some(help) = error.help() {
            eprintln!("  help: {help}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_key_joins_path_segments() {
        assert_eq!(qualified_key(&[], "name"), "name");
        assert_eq!(
            qualified_key(&["gemini".to_string()], "api_key"),
            "gemini.api_key"
        );
    }

    #[test]
    fn unknown_field_becomes_unknown_key_diagnostic() {
        let err = crate::loader::load_config_from_str("[agent]\nnaem = \"x\"\n").unwrap_err();
        let errors = figment_to_config_errors(err);
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ConfigError::UnknownKey { key, .. } if key.contains("naem")))
        );
    }
}
