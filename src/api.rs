//! HTTP adapter boundary for the web side.
//!
//! Answers two questions about Telegram users: has the bot seen them, and
//! are they in the middle of creating a habit. Spawned as a supervised task
//! in the gateway.

use crate::gateway::{DialogHandle, KnownUsers};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use habitbot_core::config::ApiConfig;
use serde_json::{json, Value};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Read-only view of bot state for web handlers.
#[derive(Clone)]
pub struct Adapter {
    users: KnownUsers,
    dialog: DialogHandle,
}

impl Adapter {
    pub fn new(users: KnownUsers, dialog: DialogHandle) -> Self {
        Self { users, dialog }
    }

    /// Whether `username` has messaged the bot since it started.
    pub fn find_tg_user(&self, username: &str) -> bool {
        self.users.contains(username)
    }

    /// Best-effort: answers `false` when the coordinator cannot be reached.
    pub async fn user_has_open_dialog(&self, username: &str) -> bool {
        self.dialog.has_open_dialog(username).await
    }
}

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    adapter: Adapter,
    api_key: Option<String>,
    uptime: Instant,
}

type ApiError = (StatusCode, Json<Value>);

/// Constant-time string comparison for API token validation.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Check bearer token auth. Returns `Err(response)` when rejected.
fn check_auth(headers: &HeaderMap, api_key: &Option<String>) -> Result<(), ApiError> {
    let Some(key) = api_key else {
        return Ok(());
    };
    let reject = |msg: &str| (StatusCode::UNAUTHORIZED, Json(json!({ "error": msg })));

    let header = headers
        .get("authorization")
        .ok_or_else(|| reject("missing Authorization header"))?;
    let value = header
        .to_str()
        .map_err(|_| reject("invalid Authorization header"))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if constant_time_eq(token, key) => Ok(()),
        _ => Err(reject("invalid token")),
    }
}

/// `GET /api/health`
async fn health(
    headers: HeaderMap,
    State(state): State<ApiState>,
) -> Result<Json<Value>, ApiError> {
    check_auth(&headers, &state.api_key)?;
    Ok(Json(json!({
        "status": "ok",
        "uptime_secs": state.uptime.elapsed().as_secs(),
        "known_users": state.adapter.users.len(),
    })))
}

/// `GET /telegram/users/{username}`
async fn find_tg_user(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    check_auth(&headers, &state.api_key)?;
    let exists = state.adapter.find_tg_user(&username);
    Ok(Json(json!({ "tg_user_name": username, "exists": exists })))
}

/// `GET /telegram/users/{username}/dialog`
async fn user_dialog(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    check_auth(&headers, &state.api_key)?;
    let open = state.adapter.user_has_open_dialog(&username).await;
    Ok(Json(json!({ "tg_user_name": username, "open_dialog": open })))
}

fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/telegram/users/{username}", get(find_tg_user))
        .route("/telegram/users/{username}/dialog", get(user_dialog))
        .with_state(state)
}

/// Serve the API until `cancel` fires. Bind or serve failures are logged
/// and end the task.
pub async fn serve(
    config: ApiConfig,
    adapter: Adapter,
    uptime: Instant,
    cancel: CancellationToken,
) {
    let api_key = if config.api_key.is_empty() {
        None
    } else {
        Some(config.api_key.clone())
    };
    let app = build_router(ApiState {
        adapter,
        api_key,
        uptime,
    });
    let addr = format!("{}:{}", config.host, config.port);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("API server failed to bind to {addr}: {e}");
            return;
        }
    };

    info!("API server listening on {addr}");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
    {
        error!("API server error: {e}");
    }
    info!("API server stopped");
}
