// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Explicit input validation at the transport boundary.
//!
//! Every inbound frame and request body goes through a typed validation
//! function returning a result -- invalid input is rejected here, before
//! anything enters the pipeline.

use serde::Deserialize;

use valet_core::ValetError;

/// A validated client-to-server WebSocket frame.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// A user prompt for the agent loop.
    SendMessage { prompt: String },
    /// Push notification token registration.
    RegisterToken { token: String },
}

/// Parses and validates one client frame.
pub fn parse_client_frame(text: &str) -> Result<ClientFrame, ValetError> {
    let frame: ClientFrame = serde_json::from_str(text)
        .map_err(|e| ValetError::Invalid(format!("malformed frame: {e}")))?;

    match &frame {
        ClientFrame::SendMessage { prompt } => validate_prompt(prompt)?,
        ClientFrame::RegisterToken { token } => validate_token(token)?,
    }
    Ok(frame)
}

/// A prompt must be non-empty and fit in one model turn.
pub fn validate_prompt(prompt: &str) -> Result<(), ValetError> {
    if prompt.trim().is_empty() {
        return Err(ValetError::Invalid("prompt must not be empty".to_string()));
    }
    if prompt.len() > 32_768 {
        return Err(ValetError::Invalid("prompt exceeds maximum length".to_string()));
    }
    Ok(())
}

/// A notification token is an opaque non-empty string.
pub fn validate_token(token: &str) -> Result<(), ValetError> {
    if token.trim().is_empty() {
        return Err(ValetError::Invalid("token must not be empty".to_string()));
    }
    Ok(())
}

/// A uid is an opaque non-empty identifier; existence is checked against
/// storage separately.
pub fn validate_uid(uid: &str) -> Result<(), ValetError> {
    if uid.trim().is_empty() {
        return Err(ValetError::Invalid("uid must not be empty".to_string()));
    }
    Ok(())
}
