//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use encounter_api::sandbox::SandboxScene;
use encounter_api::state::AppState;
use encounter_content::application::catalog::TriggerCatalog;
use encounter_test_support::{MockRng, fixed_clock};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Seconds advanced per simulated tick.
pub const TICK: f32 = 0.1;

const CATALOG: &str = r"
tuning:
  positioning_duration: 0.1
  camera_blend_duration: 0.2
  ik_blend_duration: 0.1
anchors:
  - id: bench
    name: Bench
    pose: { position: [0.0, 0.0, 0.0] }
    initiator_slot: { position: [-0.5, 0.0, 0.0] }
    partner_slot: { position: [0.5, 0.0, 0.0] }
    camera_anchors:
      - { position: [0.0, 1.6, -3.0] }
    spawn_points:
      - [2.0, 0.0, 0.0]
    partner_search_radius: 2.0
    triggers: [wave, duet, handshake, picnic]
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
      substitute_template: dancer
    playback:
      animation:
        clip: duet_clip
        target_state: Interaction
  - id: handshake
    display_name: Shake hands
    mode: partner_paired
    partner:
      allow_substitute: false
    playback:
      animation:
        clip: handshake_clip
        target_state: Interaction
  - id: picnic
    display_name: Picnic
    mode: partner_paired
    partner:
      allow_substitute: true
    playback:
      cinematic:
        sequence: picnic_sequence
        shots:
          - name: wide
";

/// Builds the full app router around a fresh sandbox with deterministic
/// Clock/RNG. Returns the state too so tests can drive simulation ticks.
pub fn build_test_app() -> (Router, AppState) {
    let catalog = TriggerCatalog::from_yaml_str(CATALOG).unwrap();
    let state = AppState::new(
        Arc::new(catalog),
        SandboxScene::new(0.5, 1.0),
        Box::new(fixed_clock()),
        Box::new(MockRng),
    );
    (encounter_api::build_router(state.clone()), state)
}

/// Advances the simulation `ticks` times.
pub fn run_ticks(state: &AppState, ticks: usize) {
    for _ in 0..ticks {
        state.advance(TICK).unwrap();
    }
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Registers a participant over HTTP and returns its ID.
pub async fn add_participant(app: Router, position: [f32; 3]) -> String {
    let (status, json) = post_json(
        app,
        "/api/v1/participants",
        &serde_json::json!({ "position": position }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["actor_id"].as_str().unwrap().to_owned()
}
