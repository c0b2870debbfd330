//! Who is in the scene, spawning substitutes and moving them around.

use glam::Vec3;

use crate::ids::ActorId;
use crate::pose::Pose;

/// Live participants known to the scene.
pub trait ParticipantDirectory {
    /// Live participants whose position lies within `radius` of `center`, in
    /// the directory's own order.
    fn participants_near(&self, center: Vec3, radius: f32) -> Vec<ActorId>;
}

/// Creates and destroys substitute actors.
pub trait ActorSpawner {
    /// Instantiates a substitute from `template` at `pose`.
    fn spawn_substitute(&mut self, template: &str, pose: Pose) -> Option<ActorId>;

    /// Destroys an actor created by [`ActorSpawner::spawn_substitute`].
    fn despawn(&mut self, actor: ActorId);
}

/// Path following and idle gestures for autonomous actors.
pub trait Navigator {
    /// Starts moving towards `destination`. Returns `false` if no path could
    /// be requested.
    fn set_destination(&mut self, actor: ActorId, destination: Vec3) -> bool;

    /// Remaining path distance, or `None` while the path is still pending.
    fn remaining_distance(&self, actor: ActorId) -> Option<f32>;

    /// Cancels any active path.
    fn stop(&mut self, actor: ActorId);

    /// Plays a one-shot idle gesture.
    fn play_gesture(&mut self, actor: ActorId, gesture: &str);
}
