//! History and storage statistics routes.

use super::error_response;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use clipstash_types::{ContentKind, Item, ItemContent, SystemData, Timestamp};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct HistoryQuery {
    /// Text filter
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub items: Vec<ItemResponse>,
}

#[derive(Serialize)]
pub struct ImageResponse {
    pub width: u32,
    pub height: u32,
    /// Where to fetch the payload.
    pub url: String,
}

/// An item as the popup renders it. Image bytes are served separately.
#[derive(Serialize)]
pub struct ItemResponse {
    pub timestamp: Timestamp,
    pub kind: ContentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageResponse>,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_app: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<String>,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        let kind = item.content.kind();
        let (text, image) = match item.content {
            ItemContent::Text(text) => (Some(text), None),
            ItemContent::Image(image) => (
                None,
                Some(ImageResponse {
                    width: image.width,
                    height: image.height,
                    url: format!("/api/items/{}/image", item.timestamp),
                }),
            ),
        };

        Self {
            timestamp: item.timestamp,
            kind,
            text,
            image,
            size_bytes: item.size_bytes,
            source_app: item.source_app,
            captured_at: item.timestamp.to_datetime().map(|dt| dt.to_rfc3339()),
        }
    }
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, (StatusCode, String)> {
    let items = state
        .gateway
        .history(query.q.as_deref(), query.limit)
        .map_err(error_response)?;

    Ok(Json(HistoryResponse {
        items: items.into_iter().map(ItemResponse::from).collect(),
    }))
}

pub async fn system(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SystemData>, (StatusCode, String)> {
    state.gateway.system_data().map(Json).map_err(error_response)
}
