//! Camera Blend Coordinator.
//!
//! Raises a shot camera above the gameplay camera for the duration of a
//! sequence and puts it back afterwards. The camera system performs the
//! actual blend; the coordinator only changes priorities and hands back a
//! fixed [`Wait`] covering the blend time.

use encounter_core::host::CameraRig;
use encounter_core::ids::CameraId;
use encounter_core::routine::Wait;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveShot {
    camera: CameraId,
    previous_priority: i32,
}

/// Tracks the one shot camera an execution has raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraBlendCoordinator {
    priority_boost: i32,
    active: Option<ActiveShot>,
}

impl CameraBlendCoordinator {
    /// Creates an inactive coordinator that raises shots `priority_boost`
    /// above the default camera.
    #[must_use]
    pub fn new(priority_boost: i32) -> Self {
        Self {
            priority_boost,
            active: None,
        }
    }

    /// Returns `true` while a shot is raised.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The raised shot camera, if any.
    #[must_use]
    pub fn active_camera(&self) -> Option<CameraId> {
        self.active.map(|shot| shot.camera)
    }

    /// Raises `camera` above the default camera and returns the blend wait.
    ///
    /// Does nothing, and returns an elapsed wait, when a shot is already
    /// active.
    pub fn activate<H: CameraRig + ?Sized>(
        &mut self,
        host: &mut H,
        camera: CameraId,
        blend: f32,
    ) -> Wait {
        if self.active.is_some() {
            return Wait::elapsed();
        }
        let previous_priority = host.priority(camera).unwrap_or(0);
        let raised = host.default_priority() + self.priority_boost;
        host.set_priority(camera, raised);
        debug!(%camera, previous_priority, raised, "shot camera activated");
        self.active = Some(ActiveShot {
            camera,
            previous_priority,
        });
        Wait::seconds(blend)
    }

    /// Restores the raised shot to the priority it had before activation
    /// and returns the blend wait.
    ///
    /// Does nothing, and returns an elapsed wait, when no shot is active.
    pub fn deactivate<H: CameraRig + ?Sized>(&mut self, host: &mut H, blend: f32) -> Wait {
        let Some(shot) = self.active.take() else {
            return Wait::elapsed();
        };
        host.set_priority(shot.camera, shot.previous_priority);
        debug!(camera = %shot.camera, priority = shot.previous_priority, "shot camera deactivated");
        Wait::seconds(blend)
    }
}
