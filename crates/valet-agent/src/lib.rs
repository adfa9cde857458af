// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent loop controller for the Valet assistant backend.
//!
//! [`AgentController::process`] turns one user prompt into a final answer:
//! - assembles the outbound turn (prompt + retrieved context + attachments)
//! - restarts the session cold when the turn ceiling is reached
//! - drives the tool loop: every pending call in a model turn is
//!   dispatched, and all results go back together in exactly one reply
//!   turn, until the model produces a terminal text answer
//! - rolls the session back on provider failure so no partial turn is
//!   persisted

pub mod session;

use std::sync::Arc;

use tracing::{debug, info, warn};

use valet_config::model::LimitsConfig;
use valet_core::types::{Attachment, ContentPart, ProviderMessage, ProviderRequest};
use valet_core::{ProviderAdapter, RetrievalAdapter, ValetError};
use valet_tools::ToolDispatcher;

pub use session::{ChatSession, SessionRegistry};

/// Drives the multi-turn exchange with the LLM provider for one prompt.
pub struct AgentController {
    provider: Arc<dyn ProviderAdapter>,
    dispatcher: Arc<ToolDispatcher>,
    retrieval: Arc<dyn RetrievalAdapter>,
    sessions: SessionRegistry,
    model: String,
    max_tokens: u32,
    max_tool_rounds: u32,
}

impl AgentController {
    pub fn new(
        provider: Arc<dyn ProviderAdapter>,
        dispatcher: Arc<ToolDispatcher>,
        retrieval: Arc<dyn RetrievalAdapter>,
        model: String,
        max_tokens: u32,
        limits: &LimitsConfig,
    ) -> Self {
        Self {
            provider,
            dispatcher,
            retrieval,
            sessions: SessionRegistry::new(limits.session_turn_ceiling),
            model,
            max_tokens,
            max_tool_rounds: limits.max_tool_rounds,
        }
    }

    /// Processes one prompt to a final answer.
    ///
    /// Holds the user's session mutex for the whole exchange: concurrent
    /// prompts for one uid serialize here, which is the documented
    /// single-writer policy for the session-reset race.
    pub async fn process(
        &self,
        uid: &str,
        prompt: &str,
        attachments: Vec<Attachment>,
    ) -> Result<String, ValetError> {
        let mut parts = vec![ContentPart::Text {
            text: prompt.to_string(),
        }];

        // Best-effort retrieval enrichment; failure never blocks the prompt.
        match self.retrieval.retrieve(uid, prompt).await {
            Ok(artifacts) => {
                for artifact in artifacts {
                    debug!(uid, name = %artifact.name, "attaching retrieved context");
                    parts.push(ContentPart::Blob {
                        mime_type: artifact.mime_type,
                        data: artifact.data,
                    });
                }
            }
            Err(e) => {
                warn!(uid, error = %e, "context retrieval failed, continuing without it");
            }
        }

        for attachment in attachments {
            parts.push(ContentPart::Blob {
                mime_type: attachment.mime_type,
                data: attachment.data,
            });
        }

        let session = self.sessions.session(uid);
        let mut session = session.lock().await;

        if session.turns() >= self.sessions.turn_ceiling() {
            info!(
                uid,
                turns = session.turns(),
                "session turn ceiling reached, starting cold"
            );
            session.reset();
        }

        // Rollback point: on provider failure nothing of this turn survives.
        let baseline = session.history_len();
        session.push(ProviderMessage::user(parts));

        let tools = if self.dispatcher.is_empty() {
            None
        } else {
            Some(self.dispatcher.declarations())
        };

        let mut rounds = 0u32;
        let reply = loop {
            let request = ProviderRequest {
                model: self.model.clone(),
                system_prompt: None,
                messages: session.history().to_vec(),
                tools: tools.clone(),
                max_tokens: Some(self.max_tokens),
            };

            let reply = match self.provider.complete(request).await {
                Ok(reply) => reply,
                Err(e) => {
                    session.truncate(baseline);
                    return Err(e);
                }
            };

            if reply.is_terminal() {
                break reply;
            }

            rounds += 1;
            if rounds > self.max_tool_rounds {
                warn!(uid, limit = self.max_tool_rounds, "tool loop ceiling hit");
                session.truncate(baseline);
                return Err(ValetError::ToolLoopExceeded {
                    limit: self.max_tool_rounds,
                });
            }

            info!(uid, count = reply.tool_calls.len(), round = rounds, "model requested tools");

            // Execute every call in the batch, then answer them all in
            // one reply turn -- partial replies are not permitted.
            let results = self.dispatcher.dispatch_batch(&reply.tool_calls).await;
            for result in &results {
                if result.is_error() {
                    warn!(uid, tool = %result.name, "tool returned an error result");
                }
            }

            let mut model_parts = Vec::new();
            if !reply.text.is_empty() {
                model_parts.push(ContentPart::Text {
                    text: reply.text.clone(),
                });
            }
            model_parts.extend(reply.tool_calls.into_iter().map(ContentPart::ToolCall));
            session.push(ProviderMessage::model(model_parts));

            session.push(ProviderMessage::user(
                results.into_iter().map(ContentPart::ToolResult).collect(),
            ));
        };

        session.push(ProviderMessage::model(vec![ContentPart::Text {
            text: reply.text.clone(),
        }]));
        session.complete_turn();

        debug!(uid, turns = session.turns(), "turn complete");
        Ok(reply.text)
    }

    /// Discards the user's conversation; the next prompt starts cold.
    pub fn reset(&self, uid: &str) {
        self.sessions.reset(uid);
    }

    /// The session registry (exposed for status reporting and tests).
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use valet_core::traits::NoRetrieval;
    use valet_core::types::ToolCall;
    use valet_core::{CalendarConnector, TaskConnector};
    use valet_test_utils::{MockCalendar, MockProvider, MockTasks};
    use valet_tools::{CalendarTool, ClockTool, TaskTool};

    fn limits(ceiling: u32, rounds: u32) -> LimitsConfig {
        LimitsConfig {
            session_turn_ceiling: ceiling,
            max_tool_rounds: rounds,
            tool_timeout_secs: 5,
        }
    }

    fn controller_with(
        provider: Arc<MockProvider>,
        limits: &LimitsConfig,
    ) -> (AgentController, Arc<MockCalendar>, Arc<MockTasks>) {
        let calendar = Arc::new(MockCalendar::new());
        let tasks = Arc::new(MockTasks::new());

        let mut dispatcher = ToolDispatcher::new(Duration::from_secs(5));
        dispatcher.register_all(CalendarTool::all(
            calendar.clone() as Arc<dyn CalendarConnector>
        ));
        dispatcher.register_all(TaskTool::all(tasks.clone() as Arc<dyn TaskConnector>));
        dispatcher.register(Arc::new(ClockTool));

        let controller = AgentController::new(
            provider,
            Arc::new(dispatcher),
            Arc::new(NoRetrieval),
            "test-model".to_string(),
            1024,
            limits,
        );
        (controller, calendar, tasks)
    }

    #[tokio::test]
    async fn plain_prompt_returns_terminal_text() {
        let provider = Arc::new(MockProvider::new());
        provider.push_text("Good afternoon.");
        let (controller, _, _) = controller_with(provider.clone(), &limits(300, 8));

        let answer = controller.process("alice", "hello", vec![]).await.unwrap();
        assert_eq!(answer, "Good afternoon.");
        assert_eq!(provider.requests().len(), 1);
    }

    #[tokio::test]
    async fn tool_batch_is_answered_in_exactly_one_reply_turn() {
        let provider = Arc::new(MockProvider::new());
        provider.push_tool_calls(vec![
            ToolCall {
                name: "get_current_datetime".to_string(),
                args: serde_json::json!({}),
            },
            ToolCall {
                name: "gcal_list_events".to_string(),
                args: serde_json::json!({"query": "lunch"}),
            },
        ]);
        provider.push_text("You are free at noon.");

        let (controller, calendar, _) = controller_with(provider.clone(), &limits(300, 8));
        let answer = controller
            .process("alice", "am I free for lunch?", vec![])
            .await
            .unwrap();
        assert_eq!(answer, "You are free at noon.");

        // The dispatcher ran each call exactly once.
        assert_eq!(calendar.calls().len(), 1);

        // Exactly two provider turns: the prompt, then ONE reply turn
        // carrying both results.
        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        let reply_turn = requests[1].messages.last().unwrap();
        assert_eq!(reply_turn.role, "user");
        let result_count = reply_turn
            .parts
            .iter()
            .filter(|p| matches!(p, ContentPart::ToolResult(_)))
            .count();
        assert_eq!(result_count, 2);
    }

    #[tokio::test]
    async fn tool_error_is_fed_back_not_fatal() {
        let provider = Arc::new(MockProvider::new());
        provider.push_tool_calls(vec![ToolCall {
            name: "todoist_add_task".to_string(),
            args: serde_json::json!({"content": "buy milk"}),
        }]);
        provider.push_text("The task tracker rejected that, sorry.");

        let (controller, _, tasks) = controller_with(provider.clone(), &limits(300, 8));
        tasks.fail_next("rate limited");

        let answer = controller.process("alice", "add a task", vec![]).await.unwrap();
        assert_eq!(answer, "The task tracker rejected that, sorry.");

        // The captured failure went back to the model as an error result.
        let requests = provider.requests();
        let reply_turn = requests[1].messages.last().unwrap();
        match &reply_turn.parts[0] {
            ContentPart::ToolResult(result) => {
                assert!(result.is_error());
            }
            other => panic!("expected tool result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_tool_keeps_the_loop_alive() {
        let provider = Arc::new(MockProvider::new());
        provider.push_tool_calls(vec![ToolCall {
            name: "not_a_real_tool".to_string(),
            args: serde_json::json!({}),
        }]);
        provider.push_text("I cannot do that.");

        let (controller, _, _) = controller_with(provider.clone(), &limits(300, 8));
        let answer = controller.process("alice", "do magic", vec![]).await.unwrap();
        assert_eq!(answer, "I cannot do that.");
    }

    #[tokio::test]
    async fn provider_failure_rolls_back_the_session() {
        let provider = Arc::new(MockProvider::new());
        let (controller, _, _) = controller_with(provider.clone(), &limits(300, 8));

        provider.fail_next("upstream 503");
        let err = controller.process("alice", "hello", vec![]).await.unwrap_err();
        assert!(matches!(err, ValetError::ProviderUnavailable { .. }));

        // No partial state: the failed prompt left nothing behind.
        let session = controller.sessions().session("alice");
        let session = session.lock().await;
        assert_eq!(session.history_len(), 0);
        assert_eq!(session.turns(), 0);
    }

    #[tokio::test]
    async fn runaway_tool_loop_is_bounded() {
        let provider = Arc::new(MockProvider::new());
        // The model keeps asking for the clock forever.
        for _ in 0..10 {
            provider.push_tool_calls(vec![ToolCall {
                name: "get_current_datetime".to_string(),
                args: serde_json::json!({}),
            }]);
        }

        let (controller, _, _) = controller_with(provider.clone(), &limits(300, 3));
        let err = controller.process("alice", "loop", vec![]).await.unwrap_err();
        assert!(matches!(err, ValetError::ToolLoopExceeded { limit: 3 }));

        // Rolled back: nothing of the aborted exchange survives.
        let session = controller.sessions().session("alice");
        assert_eq!(session.lock().await.history_len(), 0);
    }

    #[tokio::test]
    async fn ceiling_restarts_session_cold() {
        let provider = Arc::new(MockProvider::new());
        let (controller, _, _) = controller_with(provider.clone(), &limits(2, 8));

        for _ in 0..2 {
            controller.process("alice", "hi", vec![]).await.unwrap();
        }
        {
            let session = controller.sessions().session("alice");
            assert_eq!(session.lock().await.turns(), 2);
        }

        // The (N+1)th prompt starts from a fresh session with count 1.
        controller.process("alice", "hi again", vec![]).await.unwrap();
        let session = controller.sessions().session("alice");
        let session = session.lock().await;
        assert_eq!(session.turns(), 1);
        // Fresh history: one user turn + one model turn only.
        assert_eq!(session.history_len(), 2);
    }

    #[tokio::test]
    async fn retrieval_failure_does_not_block_the_prompt() {
        struct BrokenRetrieval;

        #[async_trait]
        impl RetrievalAdapter for BrokenRetrieval {
            async fn retrieve(
                &self,
                _uid: &str,
                _prompt: &str,
            ) -> Result<Vec<Attachment>, ValetError> {
                Err(ValetError::Internal("vector index offline".to_string()))
            }
        }

        let provider = Arc::new(MockProvider::new());
        provider.push_text("answered anyway");

        let mut dispatcher = ToolDispatcher::new(Duration::from_secs(5));
        dispatcher.register(Arc::new(ClockTool));
        let controller = AgentController::new(
            provider,
            Arc::new(dispatcher),
            Arc::new(BrokenRetrieval),
            "test-model".to_string(),
            1024,
            &limits(300, 8),
        );

        let answer = controller.process("alice", "hello", vec![]).await.unwrap();
        assert_eq!(answer, "answered anyway");
    }

    #[tokio::test]
    async fn attachments_ride_along_as_blobs() {
        let provider = Arc::new(MockProvider::new());
        provider.push_text("got your file");
        let (controller, _, _) = controller_with(provider.clone(), &limits(300, 8));

        controller
            .process(
                "alice",
                "summarize this",
                vec![Attachment {
                    name: "notes.pdf".to_string(),
                    mime_type: "application/pdf".to_string(),
                    data: vec![0x25, 0x50, 0x44, 0x46],
                }],
            )
            .await
            .unwrap();

        let first_turn = &provider.requests()[0].messages[0];
        let blobs = first_turn
            .parts
            .iter()
            .filter(|p| matches!(p, ContentPart::Blob { .. }))
            .count();
        assert_eq!(blobs, 1);
    }

    #[tokio::test]
    async fn reset_discards_conversation_state() {
        let provider = Arc::new(MockProvider::new());
        let (controller, _, _) = controller_with(provider.clone(), &limits(300, 8));

        controller.process("alice", "hi", vec![]).await.unwrap();
        controller.reset("alice");

        let session = controller.sessions().session("alice");
        assert_eq!(session.lock().await.turns(), 0);
    }
}
