// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording transport, notifier, and failing presence store for delivery
//! tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use valet_core::types::{AdapterType, HealthStatus};
use valet_core::{LiveTransport, NotificationAdapter, PluginAdapter, PresenceStore, ValetError};

/// One recorded emit.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedEvent {
    pub uid: String,
    pub event: String,
    pub payload: serde_json::Value,
}

/// Recording live transport. Can be armed to fail every emit, to exercise
/// the enqueue fallback path.
#[derive(Default)]
pub struct MockTransport {
    emits: Mutex<Vec<EmittedEvent>>,
    failing: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent emit fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every emit recorded so far, in order.
    pub fn emits(&self) -> Vec<EmittedEvent> {
        self.emits.lock().unwrap().clone()
    }
}

#[async_trait]
impl LiveTransport for MockTransport {
    async fn emit(
        &self,
        uid: &str,
        event: &str,
        payload: &serde_json::Value,
    ) -> Result<(), ValetError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ValetError::Transport {
                message: "mock transport armed to fail".to_string(),
                source: None,
            });
        }
        self.emits.lock().unwrap().push(EmittedEvent {
            uid: uid.to_string(),
            event: event.to_string(),
            payload: payload.clone(),
        });
        Ok(())
    }
}

/// One recorded notification send.
#[derive(Debug, Clone, PartialEq)]
pub struct SentNotification {
    pub token: String,
    pub title: String,
    pub body: String,
    pub metadata: serde_json::Value,
}

/// Recording notification adapter.
#[derive(Default)]
pub struct MockNotifier {
    sends: Mutex<Vec<SentNotification>>,
    failing: AtomicBool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sends(&self) -> Vec<SentNotification> {
        self.sends.lock().unwrap().clone()
    }
}

#[async_trait]
impl PluginAdapter for MockNotifier {
    fn name(&self) -> &str {
        "mock-notifier"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notification
    }

    async fn health_check(&self) -> Result<HealthStatus, ValetError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ValetError> {
        Ok(())
    }
}

#[async_trait]
impl NotificationAdapter for MockNotifier {
    async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        metadata: serde_json::Value,
    ) -> Result<(), ValetError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ValetError::Delivery {
                message: "mock notifier armed to fail".to_string(),
            });
        }
        self.sends.lock().unwrap().push(SentNotification {
            token: token.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            metadata,
        });
        Ok(())
    }
}

/// Presence store whose reads always fail, for exercising the
/// assume-offline policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingPresence;

#[async_trait]
impl PluginAdapter for FailingPresence {
    fn name(&self) -> &str {
        "failing-presence"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Presence
    }

    async fn health_check(&self) -> Result<HealthStatus, ValetError> {
        Ok(HealthStatus::Unhealthy("always failing".to_string()))
    }

    async fn shutdown(&self) -> Result<(), ValetError> {
        Ok(())
    }
}

#[async_trait]
impl PresenceStore for FailingPresence {
    async fn mark_online(&self, _uid: &str, _connection_id: &str) -> Result<(), ValetError> {
        Err(ValetError::PresenceCheck {
            message: "store unreachable".to_string(),
        })
    }

    async fn mark_offline(&self, _connection_id: &str) -> Result<(), ValetError> {
        Err(ValetError::PresenceCheck {
            message: "store unreachable".to_string(),
        })
    }

    async fn is_online(&self, _uid: &str) -> Result<bool, ValetError> {
        Err(ValetError::PresenceCheck {
            message: "store unreachable".to_string(),
        })
    }
}
