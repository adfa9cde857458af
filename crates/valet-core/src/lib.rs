// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Valet assistant backend.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Valet workspace. All collaborator
//! adapters implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ValetError;
pub use types::{AdapterType, DeliveryPayload, HealthStatus, MessageKind, ToolCall, ToolResult};

// Re-export all adapter traits at crate root.
pub use traits::{
    CalendarConnector, LiveTransport, NotificationAdapter, PluginAdapter, PresenceStore,
    ProviderAdapter, RetrievalAdapter, StorageAdapter, TaskConnector,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valet_error_has_expected_variants() {
        let _config = ValetError::Config("test".into());
        let _provider = ValetError::ProviderUnavailable {
            message: "test".into(),
            source: None,
        };
        let _loop_cap = ValetError::ToolLoopExceeded { limit: 8 };
        let _queue = ValetError::QueueStore {
            source: Box::new(std::io::Error::other("test")),
        };
        let _storage = ValetError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _presence = ValetError::PresenceCheck {
            message: "test".into(),
        };
        let _delivery = ValetError::Delivery {
            message: "test".into(),
        };
        let _transport = ValetError::Transport {
            message: "test".into(),
            source: None,
        };
        let _timeout = ValetError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _invalid = ValetError::Invalid("test".into());
        let _internal = ValetError::Internal("test".into());
    }

    #[test]
    fn error_display_names_the_failure() {
        let err = ValetError::ToolLoopExceeded { limit: 8 };
        assert_eq!(err.to_string(), "tool loop exceeded 8 round trips");

        let err = ValetError::PresenceCheck {
            message: "connection refused".into(),
        };
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn all_trait_modules_are_exported() {
        // Compile-time check that every adapter trait is reachable through
        // the public API.
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_provider_adapter<T: ProviderAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_presence_store<T: PresenceStore>() {}
        fn _assert_live_transport<T: LiveTransport>() {}
        fn _assert_notification_adapter<T: NotificationAdapter>() {}
        fn _assert_calendar_connector<T: CalendarConnector>() {}
        fn _assert_task_connector<T: TaskConnector>() {}
        fn _assert_retrieval_adapter<T: RetrievalAdapter>() {}
    }
}
