//! Menu API
//!
//! Item reads and writes plus the per-category reorder operation.

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use shared::models::{ItemCreate, ItemUpdate, MenuItem, ReorderEntry};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/menu", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list).post(create))
        // Must be registered before /{category}/{id}
        .route("/reorder", put(reorder))
        .route("/{category}/{id}", put(update).delete(delete))
}

/// GET /api/menu - full catalog as `{category: [item, ...]}` in display
/// order (serde_json preserves insertion order)
async fn list(State(state): State<ServerState>) -> AppResult<Json<serde_json::Value>> {
    let catalog = state.catalog.list_all().await?;

    let mut map = serde_json::Map::with_capacity(catalog.len());
    for category in catalog {
        let items = serde_json::to_value(category.items)
            .map_err(|e| AppError::internal(format!("Failed to serialize items: {e}")))?;
        map.insert(category.name, items);
    }
    Ok(Json(serde_json::Value::Object(map)))
}

/// POST /api/menu - create an item (id and position assigned by the store)
async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ItemCreate>,
) -> AppResult<Json<MenuItem>> {
    let item = state.catalog.create_item(payload).await?;
    Ok(Json(item))
}

/// PUT /api/menu/{category}/{id} - partial update
async fn update(
    State(state): State<ServerState>,
    Path((category, id)): Path<(String, i64)>,
    Json(payload): Json<ItemUpdate>,
) -> AppResult<Json<MenuItem>> {
    let item = state.catalog.update_item(&category, id, payload).await?;
    Ok(Json(item))
}

/// DELETE /api/menu/{category}/{id}
async fn delete(
    State(state): State<ServerState>,
    Path((category, id)): Path<(String, i64)>,
) -> AppResult<Json<bool>> {
    state.catalog.delete_item(&category, id).await?;
    Ok(Json(true))
}

#[derive(Debug, Deserialize)]
struct ReorderRequest {
    category: String,
    items: Vec<ReorderEntry>,
}

/// PUT /api/menu/reorder - client-submitted full ordering of one category
/// (replace semantics; entries with unknown ids may create new items)
async fn reorder(
    State(state): State<ServerState>,
    Json(payload): Json<ReorderRequest>,
) -> AppResult<Json<Vec<MenuItem>>> {
    let items = state
        .catalog
        .reorder_items(&payload.category, &payload.items)
        .await?;
    Ok(Json(items))
}
