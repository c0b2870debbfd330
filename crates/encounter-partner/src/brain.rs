//! Substitute Autonomous Behavior.
//!
//! The brain is resumed every tick but only decides something once per idle
//! interval, and only while its actor is neither interacting nor executing a
//! trigger. It reads [`InteractionFlags`] and never writes them.

use encounter_content::domain::definitions::SubstituteBehavior;
use encounter_content::domain::tuning::PipelineTuning;
use encounter_core::host::{ActorRig, Navigator};
use encounter_core::ids::ActorId;
use encounter_core::pose::{Pose, facing};
use encounter_core::rng::DeterministicRng;
use encounter_core::routine::Tick;
use tracing::debug;

/// Whether an actor is currently owned by an execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionFlags {
    /// The actor is positioned for, or taking part in, an interaction.
    pub is_interacting: bool,
    /// The actor's execution is in `Playing`.
    pub is_executing_trigger: bool,
}

impl InteractionFlags {
    /// Returns `true` when either flag is set.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.is_interacting || self.is_executing_trigger
    }
}

/// What the brain did on an idle beat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdleAction {
    /// Nothing happened.
    None,
    /// Turned to face the initiator.
    Faced,
    /// Played a gesture.
    Gestured(String),
}

/// Idle loop of one spawned substitute.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstituteBrain {
    actor: ActorId,
    initiator: ActorId,
    anchor: Pose,
    behavior: SubstituteBehavior,
    interval: f32,
    gesture_probability: f64,
    gestures: Vec<String>,
    since_last: f32,
}

impl SubstituteBrain {
    /// Creates the loop for `actor`, which stands in for the initiator's
    /// partner at `anchor`.
    #[must_use]
    pub fn new(
        actor: ActorId,
        initiator: ActorId,
        anchor: Pose,
        behavior: SubstituteBehavior,
        tuning: &PipelineTuning,
    ) -> Self {
        Self {
            actor,
            initiator,
            anchor,
            behavior,
            interval: tuning.idle_interval,
            gesture_probability: tuning.gesture_probability,
            gestures: tuning.idle_gestures.clone(),
            since_last: 0.0,
        }
    }

    /// The substitute being driven.
    #[must_use]
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// Advances the idle timer and, once per interval, acts.
    pub fn tick<H: ActorRig + Navigator + ?Sized>(
        &mut self,
        host: &mut H,
        flags: InteractionFlags,
        rng: &mut dyn DeterministicRng,
        tick: Tick,
    ) -> IdleAction {
        self.since_last += tick.delta;
        if self.since_last < self.interval {
            return IdleAction::None;
        }
        self.since_last -= self.interval;
        if flags.is_busy() || !host.is_alive(self.actor) {
            return IdleAction::None;
        }

        match self.behavior {
            SubstituteBehavior::Passive => IdleAction::None,
            SubstituteBehavior::Responsive => self.face_initiator(host),
            SubstituteBehavior::Active => self.maybe_gesture(host, rng),
        }
    }

    fn face_initiator<H: ActorRig + ?Sized>(&self, host: &mut H) -> IdleAction {
        let Some(pose) = host.pose(self.actor) else {
            return IdleAction::None;
        };
        let target = host
            .pose(self.initiator)
            .map_or(self.anchor.position, |initiator| initiator.position);
        let Some(rotation) = facing(pose.position, target) else {
            return IdleAction::None;
        };
        host.set_pose(self.actor, Pose::new(pose.position, rotation));
        IdleAction::Faced
    }

    fn maybe_gesture<H: Navigator + ?Sized>(
        &self,
        host: &mut H,
        rng: &mut dyn DeterministicRng,
    ) -> IdleAction {
        if self.gestures.is_empty() || rng.next_f64() >= self.gesture_probability {
            return IdleAction::None;
        }
        let last = u32::try_from(self.gestures.len() - 1).unwrap_or(u32::MAX);
        let index = usize::try_from(rng.next_u32_range(0, last)).unwrap_or(0);
        let Some(gesture) = self.gestures.get(index) else {
            return IdleAction::None;
        };
        debug!(actor = %self.actor, gesture, "substitute gesture");
        host.play_gesture(self.actor, gesture);
        IdleAction::Gestured(gesture.clone())
    }
}
