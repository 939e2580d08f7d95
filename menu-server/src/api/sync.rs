//! Peer sync API
//!
//! Internal endpoints for the two-node pairing. The POST side is where a
//! peer's push lands; the GET side serves the full snapshot for an
//! explicit pull. The origin tag and revision are internal to the
//! pairing and never exposed to end-user callers.

use axum::{extract::State, routing::post, Json, Router};
use shared::sync::{SnapshotAck, SnapshotPush};

use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/sync/snapshot", post(ingest).get(snapshot))
}

/// POST /api/sync/snapshot - apply a pushed snapshot
/// (dropped when reflected or stale; never re-forwarded)
async fn ingest(
    State(state): State<ServerState>,
    Json(push): Json<SnapshotPush>,
) -> AppResult<Json<SnapshotAck>> {
    let ack = state.catalog.ingest(push).await?;
    Ok(Json(ack))
}

/// GET /api/sync/snapshot - full snapshot for a peer pull
async fn snapshot(State(state): State<ServerState>) -> AppResult<Json<SnapshotPush>> {
    let push = state.catalog.build_push().await?;
    Ok(Json(push))
}
