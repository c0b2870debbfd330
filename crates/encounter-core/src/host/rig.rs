//! Per-actor transform, capability registry and IK access.

use serde::{Deserialize, Serialize};

use crate::ids::ActorId;
use crate::pose::Pose;

/// What a toggleable component contributes to an actor's normal control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityRole {
    /// Locomotion: character controllers, physics colliders, nav agents.
    Movement,
    /// Components that drive the animator from gameplay input.
    AnimationDrive,
    /// Look-at, cloth, facial and similar components that only decorate the
    /// pose the sequence produces.
    Presentation,
}

impl CapabilityRole {
    /// Returns `true` for roles switched off while a sequence owns the actor.
    #[must_use]
    pub fn is_locked_during_playback(self) -> bool {
        matches!(self, Self::Movement | Self::AnimationDrive)
    }
}

/// How a component is switched on and off.
///
/// This is the only type information needed to restore a component later:
/// behaviours are addressed by their index in the actor's registry, the other
/// kinds are singular per actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilitySlot {
    /// A toggleable behaviour component.
    Behaviour(u16),
    /// The actor's collider.
    Collider,
    /// The actor's navigation agent.
    NavigationAgent,
}

/// One entry of an actor's capability registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// What the component is for.
    pub role: CapabilityRole,
    /// How to toggle it.
    pub slot: CapabilitySlot,
    /// Whether it is currently enabled.
    pub enabled: bool,
}

/// Transform, capability registry and IK solver access for actors.
pub trait ActorRig {
    /// Returns `true` while the actor exists in the scene.
    fn is_alive(&self, actor: ActorId) -> bool;

    /// Current world pose, or `None` for unknown actors.
    fn pose(&self, actor: ActorId) -> Option<Pose>;

    /// Teleports the actor.
    fn set_pose(&mut self, actor: ActorId, pose: Pose);

    /// The actor's fixed table of optional components.
    fn capabilities(&self, actor: ActorId) -> Vec<Capability>;

    /// Enables or disables a behaviour component.
    fn set_behaviour_enabled(&mut self, actor: ActorId, index: u16, enabled: bool);

    /// Enables or disables the actor's collider.
    fn set_collider_enabled(&mut self, actor: ActorId, enabled: bool);

    /// Enables or disables the actor's navigation agent.
    fn set_navigation_enabled(&mut self, actor: ActorId, enabled: bool);

    /// Current IK influence weight, or `None` when the actor has no solver.
    fn ik_weight(&self, actor: ActorId) -> Option<f32>;

    /// Sets the IK influence weight. Ignored when the actor has no solver.
    fn set_ik_weight(&mut self, actor: ActorId, weight: f32);
}
