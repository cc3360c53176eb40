//! HTTP route handlers.

pub mod clipboard;
pub mod history;
pub mod items;

use crate::global_ws;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use clipstash_core::{ClipstashError, ErrorKind};
use serde::Serialize;
use std::sync::Arc;

/// Largest image upload accepted from the watcher adapter.
const MAX_IMAGE_BYTES: usize = 32 * 1024 * 1024;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `/api` and `/ws` routes bound to `state`.
pub fn router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/history", get(history::list))
        .route("/system", get(history::system))
        .route("/items/{ts}", delete(items::delete))
        .route("/items/{ts}/copy", post(items::copy))
        .route("/items/{ts}/image", get(items::image))
        .route("/clear", post(items::clear))
        .route("/clean", post(items::clean))
        .route("/clipboard", put(clipboard::put_text))
        .route(
            "/clipboard/image",
            put(clipboard::put_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        .route("/health", get(health));

    let ws_routes = Router::new().route("/events", get(global_ws::upgrade));

    Router::new()
        .nest("/api", api_routes)
        .nest("/ws", ws_routes)
        .with_state(state)
}

/// Map a core error to a status code and message.
pub(crate) fn error_response(e: ClipstashError) -> (StatusCode, String) {
    let status = match e.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::ClipboardAccessFailure => StatusCode::BAD_GATEWAY,
        ErrorKind::StorageFailure => {
            tracing::error!(target: "clipstash::api", "Storage failure: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, e.to_string())
}
