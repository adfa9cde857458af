// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP/WebSocket server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use valet_agent::AgentController;
use valet_core::{PresenceStore, StorageAdapter, ValetError};
use valet_delivery::DeliveryRouter;

use crate::handlers;
use crate::transport::WsTransport;
use crate::ws;

/// Shared state for axum request handlers and socket tasks.
#[derive(Clone)]
pub struct GatewayState {
    pub storage: Arc<dyn StorageAdapter>,
    pub presence: Arc<dyn PresenceStore>,
    pub transport: Arc<WsTransport>,
    pub agent: Arc<AgentController>,
    pub delivery: Arc<DeliveryRouter>,
    /// Process start time for uptime reporting.
    pub start_time: std::time::Instant,
}

/// Gateway server configuration (mirrors `GatewayConfig` from
/// valet-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Builds the gateway router over the given state.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/v1/messages", post(handlers::post_messages))
        .route("/v1/chat/reset", post(handlers::post_chat_reset))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Starts the gateway server and serves until the listener fails.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), ValetError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener =
        tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ValetError::Transport {
                message: format!("failed to bind gateway to {addr}: {e}"),
                source: Some(Box::new(e)),
            })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| ValetError::Transport {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
