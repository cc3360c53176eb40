//! Setting the clipboard from outside.
//!
//! With the in-process backend this is how captures arrive: the content is
//! stored and a change signal is queued. With the system backend the content
//! goes to the OS clipboard and the poller notices it. Either way capture
//! happens asynchronously, so these endpoints answer 202.

use super::error_response;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use clipstash_core::ClipboardSignal;
use clipstash_types::{ClipboardSnapshot, ItemContent};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Deserialize)]
pub struct TextClipboard {
    pub text: String,
    #[serde(default)]
    pub source_app: Option<String>,
}

#[derive(Deserialize)]
pub struct ImageClipboard {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub source_app: Option<String>,
}

pub async fn put_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TextClipboard>,
) -> Result<StatusCode, (StatusCode, String)> {
    if req.text.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "text must not be empty".to_string()));
    }
    publish(&state, ClipboardSnapshot::new(ItemContent::Text(req.text), req.source_app)).await
}

pub async fn put_image(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ImageClipboard>,
    body: Bytes,
) -> Result<StatusCode, (StatusCode, String)> {
    if body.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "image body must not be empty".to_string()));
    }
    let content = ItemContent::image(params.width, params.height, body.to_vec());
    publish(&state, ClipboardSnapshot::new(content, params.source_app)).await
}

async fn publish(
    state: &Arc<AppState>,
    snapshot: ClipboardSnapshot,
) -> Result<StatusCode, (StatusCode, String)> {
    debug!(
        target: "clipstash::api",
        "Clipboard set: {} ({} bytes)",
        snapshot.content.kind().as_str(),
        snapshot.content.size_bytes()
    );

    let clipboard = state.clipboard.clone();
    tokio::task::spawn_blocking(move || clipboard.publish(snapshot))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(error_response)?;

    if !state.polls_clipboard() && state.signals.send(ClipboardSignal).await.is_err() {
        warn!(target: "clipstash::api", "Clipboard watcher is not running");
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "clipboard watcher is not running".to_string(),
        ));
    }
    Ok(StatusCode::ACCEPTED)
}
