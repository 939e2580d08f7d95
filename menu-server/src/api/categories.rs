//! Category API

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use shared::models::{Category, CategoryCreate, CategoryRename};

use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/categories", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list).post(create))
        // Batch sort order update (must be before /{name} to avoid path conflicts)
        .route("/sort-order", put(reorder))
        .route("/{name}", put(rename).delete(delete))
}

/// GET /api/categories - all categories in display order
async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    let categories = state.catalog.list_categories().await?;
    Ok(Json(categories))
}

/// POST /api/categories - create a category (duplicate name rejected)
async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<Category>> {
    let category = state.catalog.create_category(payload).await?;
    Ok(Json(category))
}

/// PUT /api/categories/{name} - rename (collision rejected, no-op when
/// unchanged)
async fn rename(
    State(state): State<ServerState>,
    Path(name): Path<String>,
    Json(payload): Json<CategoryRename>,
) -> AppResult<Json<Category>> {
    let category = state.catalog.rename_category(&name, &payload.name).await?;
    Ok(Json(category))
}

/// DELETE /api/categories/{name} - delete the category and all its items
async fn delete(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> AppResult<Json<bool>> {
    state.catalog.delete_category(&name).await?;
    Ok(Json(true))
}

#[derive(Debug, Deserialize)]
struct CategoryOrderRequest {
    categories: Vec<String>,
}

/// PUT /api/categories/sort-order - full category ordering by name
async fn reorder(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryOrderRequest>,
) -> AppResult<Json<usize>> {
    let updated = state.catalog.reorder_categories(&payload.categories).await?;
    Ok(Json(updated))
}
