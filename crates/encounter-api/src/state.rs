//! Shared application state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use encounter_content::application::catalog::TriggerCatalog;
use encounter_core::clock::Clock;
use encounter_core::event::DomainEvent;
use encounter_core::ids::ExecutionHandle;
use encounter_core::rng::DeterministicRng;
use encounter_pipeline::completion::CompletionListener;
use encounter_pipeline::{ExecutionReport, PipelineServices, TriggerOrchestrator};
use tracing::{error, info};

use crate::error::ApiError;
use crate::sandbox::SandboxScene;

/// The orchestrator and the scene it drives, locked together.
pub struct Runtime {
    pub orchestrator: TriggerOrchestrator,
    pub scene: SandboxScene,
}

impl Runtime {
    /// Runs one simulation step and logs the events it produced.
    pub fn advance(&mut self, delta: f32) {
        self.orchestrator.tick(&mut self.scene, delta);
        self.scene.advance(delta);
        for event in self.orchestrator.drain_events() {
            info!(
                event_type = event.event_type(),
                execution = %event.metadata().execution,
                sequence_number = event.metadata().sequence_number,
                payload = %event.to_payload(),
                "execution event"
            );
        }
    }
}

/// Reports of finished executions, keyed by handle.
#[derive(Debug, Clone, Default)]
pub struct ReportLog(Arc<Mutex<HashMap<ExecutionHandle, ExecutionReport>>>);

impl ReportLog {
    /// The report of a finished execution.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if the log lock is poisoned.
    pub fn get(&self, handle: ExecutionHandle) -> Result<Option<ExecutionReport>, ApiError> {
        let reports = self
            .0
            .lock()
            .map_err(|_| ApiError::Internal("report log lock poisoned".to_owned()))?;
        Ok(reports.get(&handle).cloned())
    }
}

impl CompletionListener for ReportLog {
    fn on_complete(&mut self, report: &ExecutionReport) {
        info!(
            handle = %report.handle,
            trigger = %report.trigger_id,
            outcome = report.outcome.as_str(),
            "execution reported"
        );
        match self.0.lock() {
            Ok(mut reports) => {
                reports.insert(report.handle, report.clone());
            }
            Err(_) => error!(handle = %report.handle, "report log lock poisoned, report dropped"),
        }
    }
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    runtime: Arc<Mutex<Runtime>>,
    reports: ReportLog,
}

impl AppState {
    /// Create new application state around a loaded catalog.
    #[must_use]
    pub fn new(
        catalog: Arc<TriggerCatalog>,
        scene: SandboxScene,
        clock: Box<dyn Clock>,
        rng: Box<dyn DeterministicRng>,
    ) -> Self {
        let reports = ReportLog::default();
        let orchestrator = TriggerOrchestrator::new(
            catalog,
            PipelineServices {
                clock,
                rng,
                listener: Box::new(reports.clone()),
            },
        );
        Self {
            runtime: Arc::new(Mutex::new(Runtime {
                orchestrator,
                scene,
            })),
            reports,
        }
    }

    /// Locks the runtime. Never hold the guard across an `.await`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if the lock is poisoned.
    pub fn runtime(&self) -> Result<MutexGuard<'_, Runtime>, ApiError> {
        self.runtime
            .lock()
            .map_err(|_| ApiError::Internal("runtime lock poisoned".to_owned()))
    }

    /// Finished-execution reports.
    #[must_use]
    pub fn reports(&self) -> &ReportLog {
        &self.reports
    }

    /// Runs one simulation step.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if the runtime lock is poisoned.
    pub fn advance(&self, delta: f32) -> Result<(), ApiError> {
        self.runtime()?.advance(delta);
        Ok(())
    }
}
