// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST surface.
//!
//! `POST /v1/messages` is the prompt entry point used when the user
//! replies from outside the app (e.g. from a push notification): the
//! prompt is accepted, processed in the background, and the answer is
//! routed by presence like any other -- typically into the queue plus a
//! notification, since the user has no live connection.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use valet_core::StorageAdapter;

use crate::server::GatewayState;
use crate::validate;

/// Request body for POST /v1/messages.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub uid: String,
    pub prompt: String,
}

/// Request body for POST /v1/chat/reset.
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub uid: String,
}

/// Generic status response body.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

/// Resolves the uid or produces the boundary rejection: malformed uids
/// are 422, unknown uids are 401 (authorization failure, not a crash).
async fn authorize_uid(state: &GatewayState, uid: &str) -> Result<(), Response> {
    if let Err(e) = validate::validate_uid(uid) {
        return Err(error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()));
    }
    match state.storage.user_exists(uid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(error_response(
            StatusCode::UNAUTHORIZED,
            "invalid user credentials",
        )),
        Err(e) => {
            warn!(uid, error = %e, "user lookup failed");
            Err(error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "user store unavailable",
            ))
        }
    }
}

/// POST /v1/messages
///
/// Accepts a prompt for background processing and returns 202 immediately.
/// Delivery of the eventual answer is presence-routed.
pub async fn post_messages(
    State(state): State<GatewayState>,
    Json(body): Json<MessageRequest>,
) -> Response {
    if let Err(response) = authorize_uid(&state, &body.uid).await {
        return response;
    }
    if let Err(e) = validate::validate_prompt(&body.prompt) {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string());
    }

    info!(uid = %body.uid, "prompt accepted over HTTP");

    let uid = body.uid;
    let prompt = body.prompt;
    tokio::spawn(async move {
        crate::run_prompt(state, uid, prompt).await;
    });

    (
        StatusCode::ACCEPTED,
        Json(StatusResponse {
            status: "accepted".to_string(),
        }),
    )
        .into_response()
}

/// POST /v1/chat/reset
///
/// Discards the user's conversation session; the next prompt starts cold.
pub async fn post_chat_reset(
    State(state): State<GatewayState>,
    Json(body): Json<ResetRequest>,
) -> Response {
    if let Err(response) = authorize_uid(&state, &body.uid).await {
        return response;
    }

    state.agent.reset(&body.uid);
    info!(uid = %body.uid, "conversation reset");

    (
        StatusCode::OK,
        Json(StatusResponse {
            status: "success".to_string(),
        }),
    )
        .into_response()
}

/// GET /health
///
/// Unauthenticated liveness endpoint.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
