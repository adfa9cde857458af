// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket room registry implementing [`LiveTransport`].
//!
//! Rooms are keyed by uid; a user connected from several devices has
//! several senders in one room and every emit reaches all of them. The
//! registry is worker-local -- cross-worker reachability is the presence
//! store's job, this is only the delivery surface for connections this
//! worker holds.

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

use valet_core::{LiveTransport, ValetError};

/// Room registry mapping uid -> (connection_id -> frame sender).
#[derive(Default)]
pub struct WsTransport {
    rooms: DashMap<String, DashMap<String, mpsc::Sender<String>>>,
}

impl WsTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the user's room.
    pub fn join(&self, uid: &str, connection_id: &str, sender: mpsc::Sender<String>) {
        self.rooms
            .entry(uid.to_string())
            .or_default()
            .insert(connection_id.to_string(), sender);
        debug!(uid, connection_id, "joined room");
    }

    /// Removes a connection from the user's room, dropping the room when
    /// it empties. Idempotent.
    pub fn leave(&self, uid: &str, connection_id: &str) {
        if let Some(room) = self.rooms.get(uid) {
            room.remove(connection_id);
            let empty = room.is_empty();
            drop(room);
            if empty {
                self.rooms.remove_if(uid, |_, room| room.is_empty());
            }
        }
        debug!(uid, connection_id, "left room");
    }

    /// Live connections currently registered for the user.
    pub fn connection_count(&self, uid: &str) -> usize {
        self.rooms.get(uid).map(|room| room.len()).unwrap_or(0)
    }
}

/// Builds the wire frame for an event.
pub(crate) fn frame(event: &str, payload: &serde_json::Value) -> String {
    serde_json::json!({ "type": event, "data": payload }).to_string()
}

#[async_trait]
impl LiveTransport for WsTransport {
    async fn emit(
        &self,
        uid: &str,
        event: &str,
        payload: &serde_json::Value,
    ) -> Result<(), ValetError> {
        let senders: Vec<(String, mpsc::Sender<String>)> = match self.rooms.get(uid) {
            Some(room) => room
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().clone()))
                .collect(),
            None => Vec::new(),
        };

        if senders.is_empty() {
            // Presence said online but this worker holds no connection
            // (stale entry or cross-worker emit). Callers fall back to
            // the queue.
            return Err(ValetError::Transport {
                message: format!("no live connections for uid {uid}"),
                source: None,
            });
        }

        let frame = frame(event, payload);
        let mut delivered = 0usize;
        for (connection_id, sender) in senders {
            if sender.send(frame.clone()).await.is_ok() {
                delivered += 1;
            } else {
                // Receiver gone: the socket task is tearing down. Drop
                // the stale entry now rather than waiting for teardown.
                self.leave(uid, &connection_id);
            }
        }

        if delivered == 0 {
            return Err(ValetError::Transport {
                message: format!("all live connections for uid {uid} are gone"),
                source: None,
            });
        }
        Ok(())
    }
}
