//! Sliding participants onto their anchor slots.

use encounter_core::host::ActorRig;
use encounter_core::ids::ActorId;
use encounter_core::pose::Pose;
use encounter_core::routine::{Step, Tick};

#[derive(Debug, Clone, PartialEq)]
struct SlotMove {
    actor: ActorId,
    from: Option<Pose>,
    to: Pose,
}

/// Moves a group of actors from wherever they stand to their target poses
/// over a fixed duration: linear translation, shortest-arc rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct PositioningMove {
    moves: Vec<SlotMove>,
    duration: f32,
    elapsed: f32,
}

impl PositioningMove {
    /// Creates an empty move lasting `duration` seconds.
    #[must_use]
    pub fn new(duration: f32) -> Self {
        Self {
            moves: Vec::new(),
            duration: duration.max(0.0),
            elapsed: 0.0,
        }
    }

    /// Adds an actor and the pose it should end at.
    #[must_use]
    pub fn with_actor(mut self, actor: ActorId, target: Pose) -> Self {
        self.moves.push(SlotMove {
            actor,
            from: None,
            to: target,
        });
        self
    }

    /// Interpolation parameter reached so far, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }

    /// Advances the move. Start poses are captured on the first resume.
    pub fn resume<H: ActorRig + ?Sized>(&mut self, host: &mut H, tick: Tick) -> Step {
        self.elapsed += tick.delta;
        let t = self.progress();
        for slot in &mut self.moves {
            let Some(from) = slot.from.or_else(|| host.pose(slot.actor)) else {
                continue;
            };
            slot.from = Some(from);
            host.set_pose(slot.actor, from.interpolate(&slot.to, t));
        }
        if t >= 1.0 { Step::Ready(()) } else { Step::Pending }
    }
}
