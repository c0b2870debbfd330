//! Multi-track sequence (cinematic) playback.

use serde::{Deserialize, Serialize};

use crate::ids::{ActorId, CameraId, SceneObjectId, SequenceAssetId, SequenceInstanceId};

/// A runtime object a sequence track can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum BindingTarget {
    /// An animated actor.
    Actor(ActorId),
    /// A scene object.
    Object(SceneObjectId),
    /// A shot camera.
    Camera(CameraId),
}

/// Loads, binds and plays sequence assets.
pub trait SequenceDirector {
    /// Instantiates a sequence asset without starting it.
    fn load_sequence(&mut self, asset: &SequenceAssetId) -> Option<SequenceInstanceId>;

    /// Names of the instance's tracks/outputs, in authored order.
    fn track_names(&self, instance: SequenceInstanceId) -> Vec<String>;

    /// Binds a track to a runtime object.
    fn bind_track(&mut self, instance: SequenceInstanceId, track: &str, target: BindingTarget);

    /// Removes a track binding.
    fn clear_track(&mut self, instance: SequenceInstanceId, track: &str);

    /// Starts playback from the beginning.
    fn play(&mut self, instance: SequenceInstanceId);

    /// Returns `true` once playback reached its authored end (or the instance
    /// no longer exists).
    fn is_finished(&self, instance: SequenceInstanceId) -> bool;

    /// Authored duration in seconds, when the asset reports one.
    fn duration(&self, instance: SequenceInstanceId) -> Option<f32>;

    /// Stops playback and unloads the instance.
    fn stop(&mut self, instance: SequenceInstanceId);
}
