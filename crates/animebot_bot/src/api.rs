//! HTTP surface: the webhook endpoint and a health check.

use crate::{CommandRouter, parse_update};
use animebot_error::AnimebotError;
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

/// API state shared by all handlers.
#[derive(Clone)]
pub struct ApiState {
    router: Arc<CommandRouter>,
}

impl ApiState {
    /// Creates new API state.
    pub fn new(router: Arc<CommandRouter>) -> Self {
        Self { router }
    }
}

/// Creates the HTTP router.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/webhook", post(webhook))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// Receive one update and run it through the pipeline.
async fn webhook(State(state): State<ApiState>, body: Bytes) -> impl IntoResponse {
    let interaction = match parse_update(&body) {
        Ok(interaction) => interaction,
        Err(e) => {
            warn!(error = %e, "Rejected webhook payload");
            return failure(StatusCode::BAD_REQUEST, &e.kind.to_string());
        }
    };

    match state.router.handle(interaction).await {
        Ok(notification) => {
            info!(notification = notification.kind(), "Update handled");
            (StatusCode::OK, Json(json!({"status": "ok"})))
        }
        Err(e) => {
            let status = status_for(&e);
            error!(error = %e, status = status.as_u16(), "Update failed");
            failure(status, &e.kind().to_string())
        }
    }
}

fn status_for(err: &AnimebotError) -> StatusCode {
    if err.kind().is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn failure(status: StatusCode, message: &str) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(json!({"status": "error", "error": message})))
}
