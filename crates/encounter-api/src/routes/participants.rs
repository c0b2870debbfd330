//! Routes for sandbox participants.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post};
use encounter_core::error::PipelineError;
use encounter_core::ids::ActorId;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::sandbox::ActorView;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct AddParticipantRequest {
    /// World position `[x, y, z]`.
    pub position: [f32; 3],
}

/// Response body for POST /.
#[derive(Debug, Serialize)]
pub struct AddParticipantResponse {
    pub actor_id: ActorId,
}

/// An actor plus whether an execution currently involves it.
#[derive(Debug, Serialize)]
pub struct ParticipantView {
    #[serde(flatten)]
    pub actor: ActorView,
    pub busy: bool,
}

/// POST /
#[instrument(skip(state))]
async fn add_participant(
    State(state): State<AppState>,
    Json(request): Json<AddParticipantRequest>,
) -> Result<(StatusCode, Json<AddParticipantResponse>), ApiError> {
    let position = Vec3::from_array(request.position);
    if !position.is_finite() {
        return Err(PipelineError::Validation("position must be finite".to_owned()).into());
    }
    let actor_id = state.runtime()?.scene.add_participant(position);
    info!(%actor_id, "participant registered");
    Ok((StatusCode::CREATED, Json(AddParticipantResponse { actor_id })))
}

/// GET /{actor_id}
#[instrument(skip(state))]
async fn get_participant(
    State(state): State<AppState>,
    Path(actor_id): Path<ActorId>,
) -> Result<Json<ParticipantView>, ApiError> {
    let runtime = state.runtime()?;
    let actor = runtime
        .scene
        .actor(actor_id)
        .ok_or_else(|| ApiError::NotFound(format!("participant not found: {actor_id}")))?;
    Ok(Json(ParticipantView {
        actor,
        busy: runtime.orchestrator.is_busy(actor_id),
    }))
}

/// Returns the router for participants.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(add_participant))
        .route("/{actor_id}", get(get_participant))
}
