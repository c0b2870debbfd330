//! IK Weight Blender.
//!
//! Authored animation and procedural IK fight over the same bones, so IK
//! influence is faded down before a sequence and back up afterwards. A
//! blend captures its start weight on first resume and snaps exactly to its
//! target when its duration has elapsed.

use encounter_core::host::ActorRig;
use encounter_core::ids::ActorId;
use encounter_core::routine::{Step, Tick};

/// Linear blend of one actor's IK weight.
#[derive(Debug, Clone, PartialEq)]
pub struct IkBlend {
    actor: ActorId,
    target: f32,
    duration: f32,
    elapsed: f32,
    start: Option<f32>,
}

impl IkBlend {
    /// Creates a blend towards `target` over `duration` seconds.
    #[must_use]
    pub fn new(actor: ActorId, target: f32, duration: f32) -> Self {
        Self {
            actor,
            target,
            duration: duration.max(0.0),
            elapsed: 0.0,
            start: None,
        }
    }

    /// The actor being blended.
    #[must_use]
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// Advances the blend. Actors without an IK solver finish immediately
    /// and are left untouched.
    pub fn resume<H: ActorRig + ?Sized>(&mut self, host: &mut H, tick: Tick) -> Step {
        let Some(current) = host.ik_weight(self.actor) else {
            return Step::Ready(());
        };
        let start = *self.start.get_or_insert(current);
        self.elapsed += tick.delta;

        if self.duration <= 0.0 || self.elapsed >= self.duration {
            host.set_ik_weight(self.actor, self.target);
            return Step::Ready(());
        }
        let t = self.elapsed / self.duration;
        host.set_ik_weight(self.actor, start + (self.target - start) * t);
        Step::Pending
    }
}

/// Several blends resumed together; ready once all of them are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IkBlendSet {
    blends: Vec<IkBlend>,
}

impl IkBlendSet {
    /// Wraps a list of blends.
    #[must_use]
    pub fn new(blends: Vec<IkBlend>) -> Self {
        Self { blends }
    }

    /// Returns `true` when there is nothing to blend.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blends.is_empty()
    }

    /// Advances every unfinished blend by the same tick.
    pub fn resume<H: ActorRig + ?Sized>(&mut self, host: &mut H, tick: Tick) -> Step {
        self.blends
            .retain_mut(|blend| !blend.resume(host, tick).is_ready());
        if self.blends.is_empty() {
            Step::Ready(())
        } else {
            Step::Pending
        }
    }
}

/// Pre-sequence IK weights, recorded once per actor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IkWeightLedger {
    entries: Vec<(ActorId, f32)>,
}

impl IkWeightLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the actor's current weight unless it is already recorded.
    /// Returns `false` for actors without an IK solver.
    pub fn record<H: ActorRig + ?Sized>(&mut self, host: &H, actor: ActorId) -> bool {
        if self.recorded(actor).is_some() {
            return true;
        }
        match host.ik_weight(actor) {
            Some(weight) => {
                self.entries.push((actor, weight));
                true
            }
            None => false,
        }
    }

    /// The recorded weight of `actor`.
    #[must_use]
    pub fn recorded(&self, actor: ActorId) -> Option<f32> {
        self.entries
            .iter()
            .find(|(recorded, _)| *recorded == actor)
            .map(|(_, weight)| *weight)
    }

    /// Returns `true` when no weight is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Blends from the current weights towards `target` for every recorded
    /// actor.
    #[must_use]
    pub fn blend_all(&self, target: f32, duration: f32) -> IkBlendSet {
        IkBlendSet::new(
            self.entries
                .iter()
                .map(|(actor, _)| IkBlend::new(*actor, target, duration))
                .collect(),
        )
    }

    /// Blends back to each recorded weight, keeping the entries so an
    /// interrupted restore can be replayed. Call [`clear`](Self::clear) once
    /// the blends have landed.
    #[must_use]
    pub fn restore_blends(&self, duration: f32) -> IkBlendSet {
        IkBlendSet::new(
            self.entries
                .iter()
                .map(|(actor, weight)| IkBlend::new(*actor, *weight, duration))
                .collect(),
        )
    }

    /// Forgets every recorded weight.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Empties the ledger into blends back to each recorded weight. A second
    /// call yields an empty set.
    pub fn take_restore_blends(&mut self, duration: f32) -> IkBlendSet {
        IkBlendSet::new(
            self.entries
                .drain(..)
                .map(|(actor, weight)| IkBlend::new(actor, weight, duration))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use encounter_test_support::FakeScene;
    use glam::Vec3;

    use super::*;

    fn tick(index: u64) -> Tick {
        Tick::new(index, 0.25)
    }

    #[test]
    fn test_blend_interpolates_linearly() {
        // Arrange
        let mut scene = FakeScene::new();
        let actor = scene.add_participant(Vec3::ZERO);
        let mut blend = IkBlend::new(actor, 0.0, 1.0);

        // Act
        let step = blend.resume(&mut scene, tick(0));

        // Assert
        assert_eq!(step, Step::Pending);
        assert!((scene.ik_weight(actor).unwrap() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_blend_snaps_to_target_when_duration_elapses() {
        let mut scene = FakeScene::new();
        let actor = scene.add_participant(Vec3::ZERO);
        let mut blend = IkBlend::new(actor, 0.2, 1.0);

        let mut steps = 0;
        while !blend.resume(&mut scene, tick(steps)).is_ready() {
            steps += 1;
        }

        assert_eq!(steps, 3);
        assert!((scene.ik_weight(actor).unwrap() - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_blend_without_solver_is_noop() {
        let mut scene = FakeScene::new();
        let actor = scene.add_participant(Vec3::ZERO);
        scene.actor_mut(actor).unwrap().ik_weight = None;
        let mut blend = IkBlend::new(actor, 0.0, 1.0);

        assert!(blend.resume(&mut scene, tick(0)).is_ready());
        assert!(scene.calls.is_empty());
    }

    #[test]
    fn test_ledger_round_trip_restores_recorded_weights() {
        // Arrange
        let mut scene = FakeScene::new();
        let first = scene.add_participant(Vec3::ZERO);
        let second = scene.add_participant(Vec3::X);
        scene.set_ik_weight(second, 0.6);
        let mut ledger = IkWeightLedger::new();
        ledger.record(&scene, first);
        ledger.record(&scene, second);

        // Act
        let mut down = ledger.blend_all(0.0, 0.5);
        while !down.resume(&mut scene, tick(0)).is_ready() {}
        let mut up = ledger.take_restore_blends(0.5);
        while !up.resume(&mut scene, tick(1)).is_ready() {}

        // Assert
        assert!((scene.ik_weight(first).unwrap() - 1.0).abs() < f32::EPSILON);
        assert!((scene.ik_weight(second).unwrap() - 0.6).abs() < f32::EPSILON);
        assert!(ledger.is_empty());
        assert!(ledger.take_restore_blends(0.5).is_empty());
    }

    #[test]
    fn test_interrupted_restore_can_be_replayed_until_cleared() {
        // Arrange
        let mut scene = FakeScene::new();
        let actor = scene.add_participant(Vec3::ZERO);
        let mut ledger = IkWeightLedger::new();
        ledger.record(&scene, actor);
        let mut down = ledger.blend_all(0.0, 0.5);
        while !down.resume(&mut scene, tick(0)).is_ready() {}

        // Act
        let mut interrupted = ledger.restore_blends(1.0);
        assert_eq!(interrupted.resume(&mut scene, tick(1)), Step::Pending);
        let mut replay = ledger.take_restore_blends(0.5);
        while !replay.resume(&mut scene, tick(2)).is_ready() {}

        // Assert
        assert!((scene.ik_weight(actor).unwrap() - 1.0).abs() < f32::EPSILON);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_clear_forgets_recorded_weights() {
        let mut scene = FakeScene::new();
        let actor = scene.add_participant(Vec3::ZERO);
        let mut ledger = IkWeightLedger::new();
        ledger.record(&scene, actor);

        ledger.clear();

        assert!(ledger.is_empty());
        assert!(ledger.restore_blends(0.5).is_empty());
    }

    #[test]
    fn test_ledger_records_first_weight_only() {
        let mut scene = FakeScene::new();
        let actor = scene.add_participant(Vec3::ZERO);
        let mut ledger = IkWeightLedger::new();

        ledger.record(&scene, actor);
        scene.set_ik_weight(actor, 0.1);
        ledger.record(&scene, actor);

        assert_eq!(ledger.recorded(actor), Some(1.0));
    }
}
