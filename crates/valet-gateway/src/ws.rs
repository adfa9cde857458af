// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket connection lifecycle.
//!
//! Client -> Server (JSON):
//! ```json
//! {"type": "send_message", "prompt": "Am I free for lunch tomorrow?"}
//! {"type": "register_token", "token": "fcm-device-token"}
//! ```
//!
//! Server -> Client (JSON, `{"type": ..., "data": ...}` frames):
//! `connect_success`, `connect_error`, `processing`, `message`,
//! `queue_flushed`, `token_registered`, `error`.
//!
//! The handshake carries the uid as a query parameter; an unknown uid is
//! rejected with `connect_error` before any registration happens. On any
//! disconnect path the teardown below runs from the closed socket alone:
//! no client-sent message is required to mark the user offline.

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use valet_core::{PresenceStore, StorageAdapter};

use crate::server::GatewayState;
use crate::transport::frame;
use crate::validate::{self, ClientFrame};

/// Server -> client frame type constants (delivery frames `message` and
/// `queue_flushed` are defined in `valet_delivery::events`).
pub mod message_types {
    /// Handshake accepted; data carries the uid back as `token`.
    pub const CONNECT_SUCCESS: &str = "connect_success";
    /// Handshake rejected.
    pub const CONNECT_ERROR: &str = "connect_error";
    /// Prompt accepted, agent loop running.
    pub const PROCESSING: &str = "processing";
    /// Notification token registration outcome.
    pub const TOKEN_REGISTERED: &str = "token_registered";
    /// Frame-level error (validation, pipeline failure).
    pub const ERROR: &str = "error";
}

/// Query parameters of the WebSocket handshake.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    pub uid: Option<String>,
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<GatewayState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.uid))
}

/// Handles one WebSocket connection from handshake to teardown.
async fn handle_socket(socket: WebSocket, state: GatewayState, uid: Option<String>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let connection_id = uuid::Uuid::new_v4().to_string();

    // Handshake: the uid must be present, well-formed, and known.
    let uid = match uid {
        Some(uid) if validate::validate_uid(&uid).is_ok() => uid,
        _ => {
            let _ = ws_sender
                .send(Message::Text(
                    frame(
                        message_types::CONNECT_ERROR,
                        &serde_json::json!({"error": "missing uid"}),
                    )
                    .into(),
                ))
                .await;
            return;
        }
    };

    let known = match state.storage.user_exists(&uid).await {
        Ok(known) => known,
        Err(e) => {
            warn!(uid, error = %e, "user lookup failed during handshake");
            false
        }
    };
    if !known {
        info!(uid, "rejecting connection for unknown uid");
        let _ = ws_sender
            .send(Message::Text(
                frame(
                    message_types::CONNECT_ERROR,
                    &serde_json::json!({"error": "invalid user credentials"}),
                )
                .into(),
            ))
            .await;
        return;
    }

    // Register the connection: room membership, presence, sender task.
    let (tx, mut rx) = mpsc::channel::<String>(64);
    state.transport.join(&uid, &connection_id, tx.clone());
    if let Err(e) = state.presence.mark_online(&uid, &connection_id).await {
        // Deliveries will queue until presence recovers; the live
        // connection itself still works.
        warn!(uid, error = %e, "failed to mark user online");
    }

    let sender_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    info!(uid, %connection_id, "websocket connected");
    let _ = tx
        .send(frame(
            message_types::CONNECT_SUCCESS,
            &serde_json::json!({"token": uid}),
        ))
        .await;

    // Replay anything that queued up while the user was away.
    match state.delivery.flush(&uid).await {
        Ok(count) if count > 0 => debug!(uid, count, "flushed queued payloads on connect"),
        Ok(_) => {}
        Err(e) => warn!(uid, error = %e, "queue flush on connect failed"),
    }

    // Inbound event loop. Every accepted frame becomes an independent
    // task; the only state crossing tasks is presence and the queue.
    while let Some(Ok(msg)) = ws_receiver.next().await {
        match msg {
            Message::Text(text) => match validate::parse_client_frame(&text) {
                Ok(ClientFrame::SendMessage { prompt }) => {
                    debug!(uid, "prompt received");
                    let _ = tx
                        .send(frame(
                            message_types::PROCESSING,
                            &serde_json::json!({"message": "Thinking..."}),
                        ))
                        .await;

                    let task_state = state.clone();
                    let task_uid = uid.clone();
                    tokio::spawn(async move {
                        crate::run_prompt(task_state, task_uid, prompt).await;
                    });
                }
                Ok(ClientFrame::RegisterToken { token }) => {
                    let data = match state.storage.set_notification_token(&uid, &token).await {
                        Ok(()) => {
                            info!(uid, "notification token registered");
                            serde_json::json!({"status": "success"})
                        }
                        Err(e) => {
                            warn!(uid, error = %e, "notification token registration failed");
                            serde_json::json!({
                                "status": "error",
                                "error": "failed to register notification token"
                            })
                        }
                    };
                    let _ = tx.send(frame(message_types::TOKEN_REGISTERED, &data)).await;
                }
                Err(e) => {
                    debug!(uid, error = %e, "rejected invalid frame");
                    let _ = tx
                        .send(frame(
                            message_types::ERROR,
                            &serde_json::json!({"error": e.to_string()}),
                        ))
                        .await;
                }
            },
            Message::Close(_) => break,
            _ => {} // Binary, ping/pong handled by the protocol layer.
        }
    }

    // Teardown: reached on clean close and on abrupt socket loss alike.
    state.transport.leave(&uid, &connection_id);
    if let Err(e) = state.presence.mark_offline(&connection_id).await {
        warn!(uid, %connection_id, error = %e, "failed to mark user offline");
    }
    sender_task.abort();
    info!(uid, %connection_id, "websocket disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_query_deserializes_with_and_without_uid() {
        let q: WsQuery = serde_json::from_str(r#"{"uid": "alice"}"#).unwrap();
        assert_eq!(q.uid.as_deref(), Some("alice"));

        let q: WsQuery = serde_json::from_str("{}").unwrap();
        assert!(q.uid.is_none());
    }

    #[test]
    fn frame_type_constants() {
        assert_eq!(message_types::CONNECT_SUCCESS, "connect_success");
        assert_eq!(message_types::PROCESSING, "processing");
        assert_eq!(message_types::TOKEN_REGISTERED, "token_registered");
    }
}
