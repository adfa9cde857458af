// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval collaborator trait: best-effort prompt enrichment.

use async_trait::async_trait;

use crate::error::ValetError;
use crate::types::Attachment;

/// Supplies zero or more opaque content blobs to append to a prompt.
///
/// Enrichment is best-effort: a failure here must not block the prompt
/// from reaching the provider, so callers log the error and continue with
/// whatever was retrieved.
#[async_trait]
pub trait RetrievalAdapter: Send + Sync + 'static {
    /// Returns context artifacts relevant to the prompt.
    async fn retrieve(&self, uid: &str, prompt: &str) -> Result<Vec<Attachment>, ValetError>;
}

/// Retrieval adapter that never contributes anything. The default when no
/// retrieval collaborator is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetrieval;

#[async_trait]
impl RetrievalAdapter for NoRetrieval {
    async fn retrieve(&self, _uid: &str, _prompt: &str) -> Result<Vec<Attachment>, ValetError> {
        Ok(Vec::new())
    }
}
