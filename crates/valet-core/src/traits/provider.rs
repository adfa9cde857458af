// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for LLM provider integrations.

use async_trait::async_trait;

use crate::error::ValetError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderReply, ProviderRequest};

/// Adapter for LLM provider integrations.
///
/// One call is one model turn: the full conversation goes out, and the
/// reply comes back normalized to terminal text and/or pending tool calls.
/// A provider that cannot be reached returns
/// [`ValetError::ProviderUnavailable`]; everything the agent loop needs to
/// react to (tool calls, stop reasons) is data on the reply, not an error.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends one conversation turn and returns the normalized reply.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderReply, ValetError>;
}
