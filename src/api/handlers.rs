//! HTTP handlers for the producer and operations surface.
//!
//! Producers are fire-and-forget: they get an acknowledgement that the
//! notification was accepted for routing, never a delivery outcome.
//! Persisting the underlying record is the storage service's job and happens
//! before the producer calls in here.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::CurrentUser;
use crate::ws::{HubStats, Notification};

use super::error::{ApiError, ApiResult};
use super::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Liveness probe.
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Current hub membership, for capacity/liveness tooling.
///
/// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> Json<HubStats> {
    Json(state.hub.stats().await)
}

/// Request to push a notification to one user.
#[derive(Debug, Deserialize)]
pub struct SendNotificationRequest {
    /// Target user identity.
    pub user_id: String,
    /// The notification to deliver.
    pub notification: Notification,
}

/// Push a notification to every live connection of one user.
///
/// POST /api/notifications
pub async fn send_notification(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<SendNotificationRequest>,
) -> ApiResult<Json<Value>> {
    if request.user_id.is_empty() {
        return Err(ApiError::bad_request("user_id must not be empty"));
    }
    state
        .hub
        .send_to_user(&request.user_id, request.notification);
    Ok(Json(json!({ "accepted": true })))
}

/// Request to push a notification to everyone.
#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    /// The notification to deliver.
    pub notification: Notification,
}

/// Push a notification to every live connection of every user.
///
/// POST /api/broadcast
pub async fn broadcast(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<BroadcastRequest>,
) -> ApiResult<Json<Value>> {
    state.hub.broadcast_to_all(request.notification);
    Ok(Json(json!({ "accepted": true })))
}
