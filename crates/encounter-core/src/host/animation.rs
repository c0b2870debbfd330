//! Skeletal animation player access.

use crate::ids::{ActorId, ClipId};

/// Snapshot of an actor's animator.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatorState {
    /// Name of the state the animator is in (or blending into).
    pub state: String,
    /// Playback position in the current state, `1.0` = one full clip.
    pub normalized_time: f32,
    /// Whether a cross-fade is still in progress.
    pub in_transition: bool,
}

/// Override-slot based control over an actor's skeletal animation player.
pub trait AnimationDriver {
    /// Returns `true` if the actor has an animation player.
    fn has_animator(&self, actor: ActorId) -> bool;

    /// Replaces the named placeholder slot with `clip`. Returns `false` when
    /// the slot or clip is unknown.
    fn override_clip(&mut self, actor: ActorId, slot: &str, clip: &ClipId) -> bool;

    /// Restores every overridden slot to its authored clip.
    fn clear_overrides(&mut self, actor: ActorId);

    /// Cross-fades into `state` over `transition` seconds. When `interrupt` is
    /// set the fade starts even if another transition is running.
    fn cross_fade(&mut self, actor: ActorId, state: &str, transition: f32, interrupt: bool);

    /// Current animator state, or `None` without an animator.
    fn animator_state(&self, actor: ActorId) -> Option<AnimatorState>;

    /// Length of a clip in seconds, if the asset is known.
    fn clip_length(&self, clip: &ClipId) -> Option<f32>;
}
