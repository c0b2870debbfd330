//! Routes for anchors: the trigger menu and force-stop.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get, routing::post};
use encounter_content::application::query_handlers::{self, TriggerSummaryView};
use encounter_core::ids::{AnchorId, ExecutionHandle};
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for POST /{anchor_id}/force-stop.
#[derive(Debug, Serialize)]
pub struct ForceStopResponse {
    /// The execution that was asked to stop, if the anchor had one.
    pub stopped: Option<ExecutionHandle>,
}

/// GET /{anchor_id}/triggers
#[instrument(skip(state))]
async fn list_triggers(
    State(state): State<AppState>,
    Path(anchor_id): Path<AnchorId>,
) -> Result<Json<Vec<TriggerSummaryView>>, ApiError> {
    let runtime = state.runtime()?;
    let summaries = query_handlers::trigger_summaries(runtime.orchestrator.catalog(), &anchor_id)?;
    Ok(Json(summaries))
}

/// POST /{anchor_id}/force-stop
#[instrument(skip(state))]
async fn force_stop(
    State(state): State<AppState>,
    Path(anchor_id): Path<AnchorId>,
) -> Result<Json<ForceStopResponse>, ApiError> {
    let stopped = state.runtime()?.orchestrator.force_stop(&anchor_id)?;
    if let Some(handle) = stopped {
        info!(%handle, "force-stop requested");
    }
    Ok(Json(ForceStopResponse { stopped }))
}

/// Returns the router for anchors.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{anchor_id}/triggers", get(list_triggers))
        .route("/{anchor_id}/force-stop", post(force_stop))
}
