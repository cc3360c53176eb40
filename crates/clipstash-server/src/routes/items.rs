//! Item commands: copy, and the confirm-gated destructive ones.
//!
//! Gated endpoints answer `{"status":"armed","expires_at":..}` on the first
//! call and `{"status":"executed"}` when the same call repeats in time.

use super::error_response;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use clipstash_types::{GateOutcome, ItemContent, Timestamp};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Serialize)]
pub struct CopyResponse {
    /// New identity of the copied item.
    pub timestamp: Timestamp,
}

#[derive(Deserialize)]
pub struct CleanRequest {
    pub days: u32,
}

pub async fn copy(
    State(state): State<Arc<AppState>>,
    Path(ts): Path<i64>,
) -> Result<Json<CopyResponse>, (StatusCode, String)> {
    // Writes the OS clipboard
    let gateway = state.gateway.clone();
    let timestamp = tokio::task::spawn_blocking(move || gateway.copy(Timestamp::from_millis(ts)))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(error_response)?;
    Ok(Json(CopyResponse { timestamp }))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(ts): Path<i64>,
) -> Result<Json<GateOutcome>, (StatusCode, String)> {
    let outcome = state
        .gateway
        .delete_item(Timestamp::from_millis(ts))
        .map_err(error_response)?;
    Ok(Json(log_outcome("delete", outcome)))
}

pub async fn clear(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GateOutcome>, (StatusCode, String)> {
    let outcome = state.gateway.clear().map_err(error_response)?;
    Ok(Json(log_outcome("clear", outcome)))
}

pub async fn clean(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CleanRequest>,
) -> Result<Json<GateOutcome>, (StatusCode, String)> {
    let outcome = state
        .gateway
        .clean_old_items(req.days)
        .map_err(error_response)?;
    Ok(Json(log_outcome("clean", outcome)))
}

fn log_outcome(command: &str, outcome: GateOutcome) -> GateOutcome {
    if outcome.is_armed() {
        debug!(target: "clipstash::api", "{} armed, waiting for confirmation", command);
    } else {
        info!(target: "clipstash::api", "{} confirmed", command);
    }
    outcome
}

/// Raw payload of an image item.
pub async fn image(
    State(state): State<Arc<AppState>>,
    Path(ts): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let timestamp = Timestamp::from_millis(ts);
    let item = state
        .gateway
        .store()
        .get(timestamp)
        .map_err(error_response)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Item not found: {}", timestamp)))?;

    match item.content {
        ItemContent::Image(image) => Ok(([(header::CONTENT_TYPE, "image/png")], image.bytes)),
        ItemContent::Text(_) => Err((
            StatusCode::NOT_FOUND,
            format!("Item {} is not an image", timestamp),
        )),
    }
}
