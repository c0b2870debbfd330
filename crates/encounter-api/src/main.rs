//! Encounter API server entry point.

use std::sync::Arc;

use encounter_api::config::ServerConfig;
use encounter_api::error::AppError;
use encounter_api::sandbox::SandboxScene;
use encounter_api::state::AppState;
use encounter_content::application::catalog::TriggerCatalog;
use encounter_core::clock::SystemClock;
use encounter_core::rng::{DeterministicRng, StdDeterministicRng};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Encounter API server");

    let config = ServerConfig::from_env()?;
    let catalog = TriggerCatalog::load(&config.catalog_path)?;
    tracing::info!(
        path = %config.catalog_path.display(),
        triggers = catalog.trigger_count(),
        "catalog loaded"
    );

    let rng: Box<dyn DeterministicRng> = match config.sandbox_seed {
        Some(seed) => Box::new(StdDeterministicRng::seeded(seed)),
        None => Box::new(StdDeterministicRng::from_entropy()),
    };
    let app_state = AppState::new(
        Arc::new(catalog),
        SandboxScene::default(),
        Box::new(SystemClock),
        rng,
    );

    let _ticker = encounter_api::spawn_ticker(app_state.clone(), config.tick_delta());
    let app = encounter_api::build_router(app_state);

    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
