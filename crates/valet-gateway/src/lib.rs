// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket/HTTP gateway for the Valet assistant backend.
//!
//! The gateway is the live transport and the entry point for every
//! inbound event: connect/disconnect (presence lifecycle + queue flush),
//! prompts over WebSocket or HTTP, notification token registration, and
//! session resets. Each inbound event is handled as an independently
//! scheduled task; the presence store and the message queue are the only
//! state shared across tasks.

pub mod handlers;
pub mod server;
pub mod transport;
pub mod validate;
pub mod ws;

use tracing::error;

use valet_core::LiveTransport;
use valet_core::types::DeliveryPayload;

pub use server::{GatewayState, ServerConfig, build_router, start_server};
pub use transport::WsTransport;

/// Runs one prompt through the agent loop and routes the answer.
///
/// This is the unit of work spawned for every accepted prompt, from both
/// the WebSocket and HTTP entry points. Loop-terminal failures (provider
/// unavailable, tool-loop ceiling) deliver nothing; a best-effort error
/// frame goes to any live connection so the user is not left waiting.
pub(crate) async fn run_prompt(state: GatewayState, uid: String, prompt: String) {
    match state.agent.process(&uid, &prompt, Vec::new()).await {
        Ok(answer) => {
            let payload = DeliveryPayload::assistant(answer);
            if let Err(e) = state.delivery.deliver(&uid, &payload).await {
                // The router already queued what it could; this is the
                // durable-write-failed path.
                error!(uid, error = %e, "delivery failed");
            }
        }
        Err(e) => {
            error!(uid, error = %e, "prompt processing failed");
            let _ = state
                .transport
                .emit(
                    &uid,
                    ws::message_types::ERROR,
                    &serde_json::json!({"error": "the assistant is unavailable right now"}),
                )
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use valet_agent::AgentController;
    use valet_config::model::{DeliveryConfig, StorageConfig};
    use valet_core::traits::NoRetrieval;
    use valet_core::{PresenceStore, StorageAdapter};
    use valet_delivery::DeliveryRouter;
    use valet_presence::MemoryPresence;
    use valet_storage::SqliteStorage;
    use valet_test_utils::{MockNotifier, MockProvider};
    use valet_tools::{ClockTool, ToolDispatcher};

    struct Fixture {
        state: GatewayState,
        provider: Arc<MockProvider>,
        presence: Arc<MemoryPresence>,
        notifier: Arc<MockNotifier>,
        _dir: tempfile::TempDir,
    }

    async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("valet.db").to_str().unwrap().to_string(),
        }));
        storage.initialize().await.unwrap();
        storage.create_user("alice", "alice").await.unwrap();

        let presence = Arc::new(MemoryPresence::new());
        let transport = Arc::new(WsTransport::new());
        let notifier = Arc::new(MockNotifier::new());
        let provider = Arc::new(MockProvider::new());

        let mut dispatcher = ToolDispatcher::new(Duration::from_secs(5));
        dispatcher.register(Arc::new(ClockTool));

        let agent = Arc::new(AgentController::new(
            provider.clone(),
            Arc::new(dispatcher),
            Arc::new(NoRetrieval),
            "test-model".to_string(),
            1024,
            &valet_config::model::LimitsConfig::default(),
        ));

        let delivery = Arc::new(DeliveryRouter::new(
            presence.clone(),
            storage.clone(),
            transport.clone(),
            Some(notifier.clone()),
            DeliveryConfig::default(),
            "valet".to_string(),
        ));

        let state = GatewayState {
            storage,
            presence: presence.clone(),
            transport,
            agent,
            delivery,
            start_time: std::time::Instant::now(),
        };

        Fixture {
            state,
            provider,
            presence,
            notifier,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn prompt_for_online_user_arrives_over_the_socket() {
        let fx = fixture().await;
        fx.provider.push_text("You have no meetings today.");

        // Simulate a registered connection.
        let (tx, mut rx) = tokio::sync::mpsc::channel(8);
        fx.state.transport.join("alice", "c-1", tx);
        fx.presence.mark_online("alice", "c-1").await.unwrap();

        run_prompt(fx.state.clone(), "alice".to_string(), "free today?".to_string()).await;

        let frame: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(frame["type"], valet_delivery::events::MESSAGE);
        assert_eq!(frame["data"]["message"], "You have no meetings today.");
        assert_eq!(frame["data"]["kind"], "assistant");
    }

    #[tokio::test]
    async fn prompt_for_offline_user_lands_in_the_queue() {
        let fx = fixture().await;
        fx.provider.push_text("Answered while you were away.");

        run_prompt(fx.state.clone(), "alice".to_string(), "anything?".to_string()).await;

        let queued = fx.state.storage.drain("alice").await.unwrap();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].message, "Answered while you were away.");
        // No token registered, so no notification either.
        assert!(fx.notifier.sends().is_empty());
    }

    #[tokio::test]
    async fn provider_failure_delivers_nothing() {
        let fx = fixture().await;
        fx.provider.fail_next("upstream down");

        run_prompt(fx.state.clone(), "alice".to_string(), "hello".to_string()).await;

        assert!(fx.state.storage.drain("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn responses_to_concurrent_prompts_may_arrive_out_of_order() {
        // Documented expectation: independent prompts are processed and
        // delivered independently; submission order is not preserved.
        let fx = fixture().await;
        fx.provider.push_text("first answer");
        fx.provider.push_text("second answer");

        let a = tokio::spawn(run_prompt(
            fx.state.clone(),
            "alice".to_string(),
            "one".to_string(),
        ));
        let b = tokio::spawn(run_prompt(
            fx.state.clone(),
            "alice".to_string(),
            "two".to_string(),
        ));
        let _ = tokio::join!(a, b);

        let mut queued: Vec<String> = fx
            .state
            .storage
            .drain("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.message)
            .collect();
        queued.sort();
        assert_eq!(queued, vec!["first answer", "second answer"]);
    }
}
