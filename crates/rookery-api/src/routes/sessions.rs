//! Read-only session snapshots over HTTP.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use rookery_session::application::query_handlers::SessionSnapshotView;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /current
#[instrument(skip(state))]
async fn get_current_session(State(state): State<AppState>) -> Json<SessionSnapshotView> {
    let view = state.lifecycle.snapshot().await;
    debug!(session_id = %view.session_id, version = view.version, "serving session snapshot");
    Json(view)
}

/// GET /{session_id}
#[instrument(skip(state))]
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionSnapshotView>, ApiError> {
    let view = state.lifecycle.snapshot_by_id(session_id).await?;
    Ok(Json(view))
}

/// Returns the router for session queries.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/current", get(get_current_session))
        .route("/{session_id}", get(get_session))
}
