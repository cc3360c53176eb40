//! Change-notification WebSocket for history observers.

use crate::state::AppState;
use anyhow::Result;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use clipstash_types::WsServerMessage;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;

pub async fn upgrade(State(state): State<Arc<AppState>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = handle_global_websocket(socket, state).await {
            tracing::error!(target: "clipstash::ws", "Events WebSocket error: {}", e);
        }
    })
}

/// Push `history_changed` to the client whenever the history mutates.
///
/// Bursts of mutations collapse into fewer messages, but the client always
/// sees at least one message after the last mutation.
pub async fn handle_global_websocket(socket: WebSocket, state: Arc<AppState>) -> Result<()> {
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Subscribe before greeting so nothing between the two is missed
    let mut changes = state.gateway.subscribe();

    let hello = serde_json::to_string(&WsServerMessage::Connected {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })?;
    ws_tx.send(Message::Text(hello.into())).await?;

    tracing::info!(
        target: "clipstash::ws",
        "Observer connected ({} watching)",
        state.gateway.notifier().subscriber_count()
    );

    let changed = serde_json::to_string(&WsServerMessage::HistoryChanged)?;
    let mut send_task = tokio::spawn(async move {
        while changes.changed().await {
            if ws_tx
                .send(Message::Text(changed.clone().into()))
                .await
                .is_err()
            {
                tracing::debug!(target: "clipstash::ws", "Observer went away mid-send");
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_rx.next().await {
            match msg {
                Message::Ping(_) => {
                    tracing::trace!(target: "clipstash::ws::ping", "Received ping");
                }
                Message::Close(_) => {
                    tracing::debug!(target: "clipstash::ws", "Observer closed connection");
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    tracing::info!(target: "clipstash::ws", "Observer disconnected");
    Ok(())
}
