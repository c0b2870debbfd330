//! `PrepareForRole`: bringing a substitute onto its slot.
//!
//! The substitute pauses for a reaction delay, walks to the partner slot
//! unless it already stands there, and turns to the slot orientation. A walk
//! that does not arrive within the arrival timeout ends with the substitute
//! placed on the slot.

use encounter_content::domain::tuning::PipelineTuning;
use encounter_core::host::{ActorRig, Navigator};
use encounter_core::ids::ActorId;
use encounter_core::pose::Pose;
use encounter_core::routine::{Step, Tick, Wait};
use glam::Quat;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    React(Wait),
    Approach,
    Walk { elapsed: f32 },
    Turn { from: Option<Quat>, elapsed: f32 },
    Done,
}

/// Routine that moves a substitute onto `slot`.
#[derive(Debug, Clone, PartialEq)]
pub struct PrepareForRole {
    actor: ActorId,
    slot: Pose,
    stopping_distance: f32,
    arrival_timeout: f32,
    rotate_duration: f32,
    stage: Stage,
}

impl PrepareForRole {
    /// Creates the routine for `actor`.
    #[must_use]
    pub fn new(actor: ActorId, slot: Pose, tuning: &PipelineTuning) -> Self {
        Self {
            actor,
            slot,
            stopping_distance: tuning.stopping_distance,
            arrival_timeout: tuning.arrival_timeout,
            rotate_duration: tuning.rotate_duration,
            stage: Stage::React(Wait::seconds(tuning.reaction_delay)),
        }
    }

    /// Advances the routine, passing through as many stages as the tick
    /// allows.
    pub fn resume<H: ActorRig + Navigator + ?Sized>(&mut self, host: &mut H, tick: Tick) -> Step {
        let mut tick = tick;
        loop {
            if !host.is_alive(self.actor) {
                self.stage = Stage::Done;
            }
            self.stage = match self.stage {
                Stage::React(mut wait) => {
                    if wait.resume(tick) == Step::Pending {
                        self.stage = Stage::React(wait);
                        return Step::Pending;
                    }
                    Stage::Approach
                }
                Stage::Approach => self.approach(host),
                Stage::Walk { elapsed } => {
                    let elapsed = elapsed + tick.delta;
                    match self.walk(host, elapsed) {
                        Some(next) => next,
                        None => {
                            self.stage = Stage::Walk { elapsed };
                            return Step::Pending;
                        }
                    }
                }
                Stage::Turn { from, elapsed } => {
                    let elapsed = elapsed + tick.delta;
                    if let Some(next) = self.turn(host, from, elapsed) {
                        next
                    } else {
                        return Step::Pending;
                    }
                }
                Stage::Done => return Step::Ready(()),
            };
            tick = tick.settle();
        }
    }

    fn approach<H: ActorRig + Navigator + ?Sized>(&self, host: &mut H) -> Stage {
        let Some(pose) = host.pose(self.actor) else {
            return Stage::Done;
        };
        if pose.position.distance(self.slot.position) <= self.stopping_distance {
            return Stage::Turn {
                from: None,
                elapsed: 0.0,
            };
        }
        if !host.set_destination(self.actor, self.slot.position) {
            warn!(actor = %self.actor, "no path to partner slot, placing substitute");
            host.set_pose(self.actor, Pose::new(self.slot.position, pose.rotation));
            return Stage::Turn {
                from: None,
                elapsed: 0.0,
            };
        }
        debug!(actor = %self.actor, "substitute walking to partner slot");
        Stage::Walk { elapsed: 0.0 }
    }

    fn walk<H: ActorRig + Navigator + ?Sized>(&self, host: &mut H, elapsed: f32) -> Option<Stage> {
        let arrived = host
            .remaining_distance(self.actor)
            .is_some_and(|remaining| remaining <= self.stopping_distance);
        if arrived {
            host.stop(self.actor);
        } else if elapsed >= self.arrival_timeout {
            warn!(actor = %self.actor, elapsed, "substitute arrival timed out, placing on slot");
            host.stop(self.actor);
            let rotation = host.pose(self.actor).map_or(self.slot.rotation, |p| p.rotation);
            host.set_pose(self.actor, Pose::new(self.slot.position, rotation));
        } else {
            return None;
        }
        Some(Stage::Turn {
            from: None,
            elapsed: 0.0,
        })
    }

    fn turn<H: ActorRig + ?Sized>(
        &mut self,
        host: &mut H,
        from: Option<Quat>,
        elapsed: f32,
    ) -> Option<Stage> {
        let Some(pose) = host.pose(self.actor) else {
            return Some(Stage::Done);
        };
        let from = from.unwrap_or(pose.rotation);
        let t = if self.rotate_duration <= 0.0 {
            1.0
        } else {
            elapsed / self.rotate_duration
        };
        if t >= 1.0 {
            host.set_pose(self.actor, Pose::new(pose.position, self.slot.rotation));
            return Some(Stage::Done);
        }
        let rotation = from.slerp(self.slot.rotation, t).normalize();
        host.set_pose(self.actor, Pose::new(pose.position, rotation));
        self.stage = Stage::Turn {
            from: Some(from),
            elapsed,
        };
        None
    }
}
