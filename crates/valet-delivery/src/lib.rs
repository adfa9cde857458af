// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Presence-aware delivery routing.
//!
//! Given a finished answer, the [`DeliveryRouter`] consults the presence
//! store: a reachable user gets the payload pushed over the live
//! transport; an offline user gets it appended to the durable queue plus
//! a push notification. On reconnect, [`DeliveryRouter::flush`] drains
//! the queue and replays it in original order.
//!
//! Failure policy, from most to least severe:
//! - queue write failure is surfaced to the caller (a silently dropped
//!   payload would break the durability contract)
//! - presence read failure downgrades to "assume offline"
//! - live emit failure falls back to the offline path (at-least-once)
//! - notification failure is logged and forgotten (the payload is already
//!   persisted)

use std::sync::Arc;

use tracing::{debug, info, warn};

use valet_config::model::DeliveryConfig;
use valet_core::types::DeliveryPayload;
use valet_core::{
    LiveTransport, NotificationAdapter, PresenceStore, StorageAdapter, ValetError,
};

/// Event names emitted over the live transport.
pub mod events {
    /// One delivered payload.
    pub const MESSAGE: &str = "message";
    /// All queued payloads have been replayed after reconnect.
    pub const QUEUE_FLUSHED: &str = "queue_flushed";
}

/// Routes finished answers to the live transport or the durable queue.
pub struct DeliveryRouter {
    presence: Arc<dyn PresenceStore>,
    storage: Arc<dyn StorageAdapter>,
    transport: Arc<dyn LiveTransport>,
    notifier: Option<Arc<dyn NotificationAdapter>>,
    config: DeliveryConfig,
    default_title: String,
}

impl DeliveryRouter {
    pub fn new(
        presence: Arc<dyn PresenceStore>,
        storage: Arc<dyn StorageAdapter>,
        transport: Arc<dyn LiveTransport>,
        notifier: Option<Arc<dyn NotificationAdapter>>,
        config: DeliveryConfig,
        default_title: String,
    ) -> Self {
        Self {
            presence,
            storage,
            transport,
            notifier,
            config,
            default_title,
        }
    }

    /// Delivers one payload to the user, live or queued.
    pub async fn deliver(&self, uid: &str, payload: &DeliveryPayload) -> Result<(), ValetError> {
        let online = match self.presence.is_online(uid).await {
            Ok(online) => online,
            Err(e) => {
                // Conservative: queueing a reachable user loses nothing,
                // a direct push to an unreachable one loses the message.
                warn!(uid, error = %e, "presence check failed, assuming offline");
                false
            }
        };

        if online {
            match self
                .transport
                .emit(uid, events::MESSAGE, &payload_value(payload)?)
                .await
            {
                Ok(()) => {
                    debug!(uid, "payload delivered over live transport");
                    return Ok(());
                }
                Err(e) => {
                    warn!(uid, error = %e, "live emit failed, falling back to queue");
                }
            }
        }

        // Offline path: durable write first, then best-effort notification.
        self.storage.enqueue(uid, payload).await?;
        info!(uid, "payload queued for offline delivery");

        self.notify(uid, payload).await;
        Ok(())
    }

    /// Drains the user's queue and replays every payload over the live
    /// transport in original order, then signals `queue_flushed`.
    ///
    /// If a replay emit fails, the unreplayed tail (including the failed
    /// payload) is re-queued in order, so nothing is lost; the user may
    /// see duplicates after the next reconnect (at-least-once).
    pub async fn flush(&self, uid: &str) -> Result<usize, ValetError> {
        let payloads = self.storage.drain(uid).await?;
        let total = payloads.len();

        for (index, payload) in payloads.iter().enumerate() {
            if let Err(e) = self
                .transport
                .emit(uid, events::MESSAGE, &payload_value(payload)?)
                .await
            {
                warn!(uid, index, error = %e, "replay emit failed, re-queueing tail");
                for remaining in &payloads[index..] {
                    if let Err(enqueue_err) = self.storage.enqueue(uid, remaining).await {
                        // Both transport and queue are failing; nothing
                        // more can be done here but make noise.
                        tracing::error!(uid, error = %enqueue_err, "failed to re-queue after replay failure");
                        return Err(enqueue_err);
                    }
                }
                return Err(ValetError::Delivery {
                    message: format!("queue replay interrupted at entry {index} of {total}"),
                });
            }
        }

        if let Err(e) = self
            .transport
            .emit(uid, events::QUEUE_FLUSHED, &serde_json::json!({ "count": total }))
            .await
        {
            warn!(uid, error = %e, "failed to signal queue flush");
        }

        if total > 0 {
            info!(uid, count = total, "queue flushed");
        }
        Ok(total)
    }

    /// Best-effort push notification for a queued payload. Never errors:
    /// an absent token is logged, a send failure is logged.
    async fn notify(&self, uid: &str, payload: &DeliveryPayload) {
        let Some(notifier) = &self.notifier else {
            debug!(uid, "no notification adapter configured");
            return;
        };

        let token = match self.storage.notification_token(uid).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                info!(uid, "no notification token registered, skipping push");
                return;
            }
            Err(e) => {
                warn!(uid, error = %e, "failed to look up notification token");
                return;
            }
        };

        let title = self
            .config
            .notification_title
            .clone()
            .unwrap_or_else(|| self.default_title.clone());
        let body = truncate_chars(&payload.message, self.config.body_limit);
        let metadata = serde_json::json!({
            "app": self.config.app_identifier,
            "kind": payload.kind,
            "link": self.config.link,
        });

        match notifier.send(&token, &title, &body, metadata).await {
            Ok(()) => debug!(uid, "push notification sent"),
            Err(e) => warn!(uid, error = %e, "push notification failed"),
        }
    }
}

fn payload_value(payload: &DeliveryPayload) -> Result<serde_json::Value, ValetError> {
    serde_json::to_value(payload).map_err(|e| ValetError::Internal(e.to_string()))
}

/// Truncates to at most `limit` characters, on a char boundary.
fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    text.chars().take(limit).collect()
}
