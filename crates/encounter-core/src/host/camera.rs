//! Virtual camera access.
//!
//! The camera system owns blending; the pipeline only creates shot cameras
//! and moves their priority relative to the default gameplay camera.

use crate::ids::CameraId;
use crate::shot::ShotPlacement;

/// Priority-based virtual camera control.
pub trait CameraRig {
    /// Priority of the default gameplay camera.
    fn default_priority(&self) -> i32;

    /// Creates a shot camera. Returns `None` if the camera system refused.
    fn spawn_shot(&mut self, placement: &ShotPlacement) -> Option<CameraId>;

    /// Current priority of a shot camera.
    fn priority(&self, camera: CameraId) -> Option<i32>;

    /// Changes the priority of a shot camera.
    fn set_priority(&mut self, camera: CameraId, priority: i32);

    /// Destroys a shot camera.
    fn despawn_shot(&mut self, camera: CameraId);
}
