//! HTTP API
//!
//! Thin routing layer: handlers parse the request, delegate to the
//! catalog service or the image vault, and map errors through
//! [`crate::utils::AppError`]. All semantics live below this layer.

pub mod categories;
pub mod images;
pub mod menu;
pub mod sync;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(menu::router())
        .merge(categories::router())
        .merge(images::router())
        .merge(sync::router())
        .layer(TraceLayer::new_for_http())
        // The kiosk frontend is served from another origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}
