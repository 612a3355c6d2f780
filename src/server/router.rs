//! HTTP router for registry-auth
//!
//! This module defines the axum router for the registry's auth-check hook:
//! - `POST /authentication` for username/token validation
//! - `POST /authorization` for scope authorization
//! - `GET /health` as a liveness probe
//!
//! Decisions map to transport status only: Allow → 200, Deny → 401, pool
//! exhaustion → 503. Request bodies are never echoed back.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::AccessControl;
use crate::error::{DecodeError, StoreError};
use crate::models::{Credential, Decision};
use crate::store::PermissionStore;

/// Request header carrying the caller's execution/trace identifier
pub const EXEC_ID_HEADER: &str = "x-exec-id";

/// Shared application state
pub struct AppState<S: PermissionStore> {
    /// Decision engine
    pub access: Arc<AccessControl<S>>,
}

impl<S: PermissionStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            access: Arc::clone(&self.access),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Build the application router
pub fn build_router<S: PermissionStore + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/authentication", post(authentication_handler::<S>))
        .route("/authorization", post(authorization_handler::<S>))
        .with_state(state)
}

/// Extract the correlation id from the request headers
///
/// The id is opaque and has no effect on the decision; an absent or
/// non-UTF-8 header yields an empty id, never an error.
fn exec_id(headers: &HeaderMap) -> String {
    headers
        .get(EXEC_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn authentication_handler<S: PermissionStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let exec_id = exec_id(&headers);

    let credential: Credential = match serde_json::from_slice(&body)
        .map_err(|e| DecodeError::Credential(e.to_string()))
    {
        Ok(credential) => credential,
        Err(e) => {
            // Fail closed on a garbled payload; the parse detail stays in
            // the server log.
            tracing::warn!(%exec_id, error = %e, "Malformed credential payload, denying");
            return StatusCode::UNAUTHORIZED;
        }
    };

    match state.access.authenticate(&credential, &exec_id) {
        Decision::Allow => StatusCode::OK,
        Decision::Deny => StatusCode::UNAUTHORIZED,
    }
}

async fn authorization_handler<S: PermissionStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let exec_id = exec_id(&headers);

    match state.access.authorize(&body, &exec_id).await {
        Ok(Decision::Allow) => StatusCode::OK,
        Ok(Decision::Deny) => StatusCode::UNAUTHORIZED,
        Err(StoreError::PoolExhausted) => StatusCode::SERVICE_UNAVAILABLE,
        Err(e) => {
            tracing::warn!(%exec_id, error = %e, "Unexpected store failure, denying");
            StatusCode::UNAUTHORIZED
        }
    }
}
