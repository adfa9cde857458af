// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user conversation sessions and the process-wide session registry.
//!
//! Each session holds the provider message history and a user-visible
//! turn counter. When the counter reaches the configured ceiling, the
//! session is discarded and restarted cold before the next turn, bounding
//! context growth.
//!
//! The registry replaces a global singleton chat handle: sessions are
//! keyed by uid and each is guarded by its own async mutex. Concurrent
//! prompts for the same uid serialize on that mutex for the duration of
//! the provider exchange; prompts for different uids never contend.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use valet_core::types::ProviderMessage;

/// One user's active model conversation.
#[derive(Debug, Default)]
pub struct ChatSession {
    history: Vec<ProviderMessage>,
    turns: u32,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed user-visible turns in this session.
    pub fn turns(&self) -> u32 {
        self.turns
    }

    /// The full provider conversation so far.
    pub fn history(&self) -> &[ProviderMessage] {
        &self.history
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Appends one message to the conversation.
    pub fn push(&mut self, message: ProviderMessage) {
        self.history.push(message);
    }

    /// Rolls the conversation back to a prior length. Used when a prompt
    /// fails mid-exchange so no partial turn is persisted.
    pub fn truncate(&mut self, len: usize) {
        self.history.truncate(len);
    }

    /// Counts one completed user-visible turn, regardless of how many
    /// tool round-trips it took.
    pub fn complete_turn(&mut self) {
        self.turns += 1;
    }

    /// Discards the conversation and resets the counter.
    pub fn reset(&mut self) {
        self.history.clear();
        self.turns = 0;
    }
}

/// Process-wide session registry keyed by uid.
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<Mutex<ChatSession>>>,
    turn_ceiling: u32,
}

impl SessionRegistry {
    pub fn new(turn_ceiling: u32) -> Self {
        Self {
            sessions: DashMap::new(),
            turn_ceiling,
        }
    }

    /// Turns a session may accumulate before being restarted cold.
    pub fn turn_ceiling(&self) -> u32 {
        self.turn_ceiling
    }

    /// Returns the user's session, creating an empty one on first use.
    pub fn session(&self, uid: &str) -> Arc<Mutex<ChatSession>> {
        self.sessions
            .entry(uid.to_string())
            .or_insert_with(|| {
                debug!(uid, "created conversation session");
                Arc::new(Mutex::new(ChatSession::new()))
            })
            .clone()
    }

    /// Discards the user's session entirely. The next prompt starts cold.
    pub fn reset(&self, uid: &str) {
        if self.sessions.remove(uid).is_some() {
            debug!(uid, "conversation session discarded");
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valet_core::types::ContentPart;

    #[test]
    fn session_tracks_turns_and_history() {
        let mut session = ChatSession::new();
        assert_eq!(session.turns(), 0);

        session.push(ProviderMessage::user(vec![ContentPart::Text {
            text: "hi".to_string(),
        }]));
        session.complete_turn();
        assert_eq!(session.turns(), 1);
        assert_eq!(session.history_len(), 1);

        session.reset();
        assert_eq!(session.turns(), 0);
        assert_eq!(session.history_len(), 0);
    }

    #[test]
    fn truncate_rolls_back_partial_turns() {
        let mut session = ChatSession::new();
        session.push(ProviderMessage::user(vec![]));
        let baseline = session.history_len();
        session.push(ProviderMessage::user(vec![]));
        session.push(ProviderMessage::model(vec![]));

        session.truncate(baseline);
        assert_eq!(session.history_len(), 1);
    }

    #[tokio::test]
    async fn registry_returns_same_session_for_same_uid() {
        let registry = SessionRegistry::new(300);
        let a = registry.session("alice");
        let b = registry.session("alice");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);

        let c = registry.session("bob");
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn reset_discards_the_session() {
        let registry = SessionRegistry::new(300);
        {
            let session = registry.session("alice");
            session.lock().await.complete_turn();
        }
        registry.reset("alice");

        let fresh = registry.session("alice");
        assert_eq!(fresh.lock().await.turns(), 0);
        // Resetting an absent uid is a no-op.
        registry.reset("nobody");
    }
}
