use axum::{extract::State, http::header, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use timeline_quiz_core::{Item, ItemId, SanitizedConfig};

use crate::metrics::encode_metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// An item as shown to players: no year, no correct position.
#[derive(Debug, Clone, Serialize)]
pub struct ItemView {
    pub id: ItemId,
    pub name: String,
    pub description: String,
}

impl From<&Item> for ItemView {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct ListItemsResponse {
    pub items: Vec<ItemView>,
    pub slot_count: usize,
}

/// Configured items in configured order.
pub async fn list_items(State(state): State<Arc<AppState>>) -> Json<ListItemsResponse> {
    let catalog = state.catalog();
    Json(ListItemsResponse {
        items: catalog.items().iter().map(ItemView::from).collect(),
        slot_count: catalog.len(),
    })
}

/// Prometheus scrape endpoint.
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
