//! Routes for trigger executions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post};
use encounter_core::error::PipelineError;
use encounter_core::ids::{ActorId, AnchorId, ExecutionHandle, TriggerId};
use encounter_pipeline::{ExecutionOutcome, ExecutionReport, ExecutionSnapshot, Phase};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    /// Trigger to run.
    pub trigger_id: String,
    /// Anchor to run it at.
    pub anchor_id: String,
    /// Participant that initiated the trigger.
    pub initiator: Uuid,
}

/// Response body for an admitted execution.
#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub handle: ExecutionHandle,
}

/// Status of an execution, active or finished.
#[derive(Debug, Serialize)]
pub struct ExecutionView {
    pub handle: ExecutionHandle,
    pub trigger_id: TriggerId,
    pub anchor_id: AnchorId,
    pub initiator: ActorId,
    pub partner: Option<ActorId>,
    pub substituted: bool,
    /// `true` once the execution has reported.
    pub finished: bool,
    /// Current phase; `Completed` or `Cancelled` once finished.
    pub phase: Phase,
    pub cancel_requested: bool,
    /// Present once finished.
    pub outcome: Option<ExecutionOutcome>,
}

impl From<ExecutionSnapshot> for ExecutionView {
    fn from(snapshot: ExecutionSnapshot) -> Self {
        Self {
            handle: snapshot.handle,
            trigger_id: snapshot.trigger_id,
            anchor_id: snapshot.anchor_id,
            initiator: snapshot.initiator,
            partner: snapshot.partner,
            substituted: snapshot.substituted,
            finished: false,
            phase: snapshot.phase,
            cancel_requested: snapshot.cancel_requested,
            outcome: None,
        }
    }
}

impl From<ExecutionReport> for ExecutionView {
    fn from(report: ExecutionReport) -> Self {
        let cancelled = report.outcome == ExecutionOutcome::Cancelled;
        Self {
            handle: report.handle,
            trigger_id: report.trigger_id,
            anchor_id: report.anchor_id,
            initiator: report.initiator,
            partner: report.partner,
            substituted: report.substituted,
            finished: true,
            phase: if cancelled {
                Phase::Cancelled
            } else {
                Phase::Completed
            },
            cancel_requested: cancelled,
            outcome: Some(report.outcome),
        }
    }
}

/// POST /
#[instrument(
    skip(state, request),
    fields(trigger_id = %request.trigger_id, anchor_id = %request.anchor_id)
)]
async fn execute_trigger(
    State(state): State<AppState>,
    Json(request): Json<ExecuteRequest>,
) -> Result<(StatusCode, Json<ExecuteResponse>), ApiError> {
    if request.trigger_id.trim().is_empty() || request.anchor_id.trim().is_empty() {
        return Err(PipelineError::Validation(
            "trigger_id and anchor_id must not be empty".to_owned(),
        )
        .into());
    }

    let handle = state.runtime()?.orchestrator.execute(
        &TriggerId::from(request.trigger_id.as_str()),
        &AnchorId::from(request.anchor_id.as_str()),
        ActorId::from(request.initiator),
    )?;

    info!(%handle, "execution admitted");

    Ok((StatusCode::ACCEPTED, Json(ExecuteResponse { handle })))
}

/// GET /{handle}
#[instrument(skip(state))]
async fn get_execution(
    State(state): State<AppState>,
    Path(handle): Path<ExecutionHandle>,
) -> Result<Json<ExecutionView>, ApiError> {
    if let Some(snapshot) = state.runtime()?.orchestrator.snapshot(handle) {
        return Ok(Json(snapshot.into()));
    }
    state
        .reports()
        .get(handle)?
        .map(|report| Json(report.into()))
        .ok_or_else(|| PipelineError::ExecutionNotFound(handle).into())
}

/// POST /{handle}/cancel
#[instrument(skip(state))]
async fn cancel_execution(
    State(state): State<AppState>,
    Path(handle): Path<ExecutionHandle>,
) -> Result<StatusCode, ApiError> {
    state.runtime()?.orchestrator.cancel(handle)?;
    info!(%handle, "cancellation requested");
    Ok(StatusCode::ACCEPTED)
}

/// Returns the router for executions.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(execute_trigger))
        .route("/{handle}", get(get_execution))
        .route("/{handle}/cancel", post(cancel_execution))
}
