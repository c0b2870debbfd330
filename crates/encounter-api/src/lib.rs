//! Encounter API — HTTP surface over the trigger pipeline sandbox.

pub mod config;
pub mod error;
pub mod routes;
pub mod sandbox;
pub mod state;

use std::time::Duration;

use axum::Router;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::state::AppState;

/// Builds the full application router.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/anchors", routes::anchors::router())
        .nest("/api/v1/executions", routes::executions::router())
        .nest("/api/v1/participants", routes::participants::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Drives the sandbox at a fixed rate until the runtime becomes unusable.
pub fn spawn_ticker(state: AppState, delta: f32) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs_f32(delta));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if let Err(err) = state.advance(delta) {
                error!(?err, "simulation tick failed, stopping ticker");
                break;
            }
        }
    })
}
