//! Shared state builders for route unit tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use encounter_content::application::catalog::TriggerCatalog;
use encounter_test_support::{MockRng, fixed_clock};
use serde_json::Value;

use crate::sandbox::SandboxScene;
use crate::state::AppState;

pub(crate) const CATALOG: &str = r"
tuning:
  positioning_duration: 0.1
  camera_blend_duration: 0.1
  ik_blend_duration: 0.1
anchors:
  - id: bench
    name: Bench
    pose: { position: [0.0, 0.0, 0.0] }
    spawn_points:
      - [2.0, 0.0, 0.0]
    partner_search_radius: 2.0
    triggers: [wave, duet]
triggers:
  - id: wave
    display_name: Wave
    mode: single_actor
    playback:
      animation:
        clip: wave_clip
        target_state: Interaction
  - id: duet
    display_name: Duet
    mode: partner_paired
    partner:
      allow_substitute: true
    playback:
      animation:
        clip: duet_clip
        target_state: Interaction
";

pub(crate) fn test_state() -> AppState {
    let catalog = TriggerCatalog::from_yaml_str(CATALOG).unwrap();
    AppState::new(
        Arc::new(catalog),
        SandboxScene::new(0.5, 1.0),
        Box::new(fixed_clock()),
        Box::new(MockRng),
    )
}

pub(crate) fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub(crate) fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub(crate) async fn body_json(response: axum::response::Response) -> Value {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}
