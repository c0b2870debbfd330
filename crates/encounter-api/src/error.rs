//! Encounter API — error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use encounter_content::error::CatalogError;
use encounter_core::error::PipelineError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The trigger catalog could not be loaded.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer error that implements `IntoResponse`.
#[derive(Debug)]
pub enum ApiError {
    /// A request the pipeline rejected.
    Pipeline(PipelineError),
    /// A sandbox resource (participant, finished execution) that does not
    /// exist.
    NotFound(String),
    /// The shared runtime is unusable.
    Internal(String),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self::Pipeline(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            Self::Pipeline(err) => match err {
                PipelineError::AlreadyExecuting(_) => (StatusCode::CONFLICT, "already_executing"),
                PipelineError::ParticipantBusy(_) => (StatusCode::CONFLICT, "participant_busy"),
                PipelineError::TriggerNotFound(_) => (StatusCode::NOT_FOUND, "trigger_not_found"),
                PipelineError::AnchorNotFound(_) => (StatusCode::NOT_FOUND, "anchor_not_found"),
                PipelineError::ExecutionNotFound(_) => {
                    (StatusCode::NOT_FOUND, "execution_not_found")
                }
                PipelineError::TriggerNotOffered { .. } => {
                    (StatusCode::BAD_REQUEST, "trigger_not_offered")
                }
                PipelineError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                PipelineError::Configuration(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
                }
            },
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let message = match self {
            Self::Pipeline(err) => err.to_string(),
            Self::NotFound(message) | Self::Internal(message) => message,
        };
        let body = ErrorBody {
            error: error_code,
            message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use encounter_core::ids::{ActorId, AnchorId, ExecutionHandle, TriggerId};

    use super::*;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_already_executing_maps_to_409() {
        assert_eq!(
            status_of(PipelineError::AlreadyExecuting(AnchorId::from("bench"))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(PipelineError::ParticipantBusy(ActorId::new())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_unknown_ids_map_to_404() {
        assert_eq!(
            status_of(PipelineError::TriggerNotFound(TriggerId::from("juggle"))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(PipelineError::ExecutionNotFound(ExecutionHandle::new())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ApiError::NotFound("participant".to_owned())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_unoffered_trigger_maps_to_400() {
        assert_eq!(
            status_of(PipelineError::TriggerNotOffered {
                trigger: TriggerId::from("wave"),
                anchor: AnchorId::from("bench"),
            }),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_maps_to_500() {
        assert_eq!(
            status_of(ApiError::Internal("lock poisoned".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
