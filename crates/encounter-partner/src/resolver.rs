//! Partner Resolver.
//!
//! Picks the second actor for a paired trigger. The first live candidate in
//! range wins; there is no ranking. Without one, and when the trigger allows
//! it, a substitute is spawned at the spawn point farthest from the
//! initiator, facing the initiator.

use encounter_content::domain::anchors::AnchorDefinition;
use encounter_content::domain::definitions::TriggerDefinition;
use encounter_content::domain::tuning::PipelineTuning;
use encounter_core::host::{ActorRig, ActorSpawner};
use encounter_core::ids::ActorId;
use encounter_core::pose::{Pose, facing};
use glam::{Quat, Vec3};
use tracing::{info, warn};

use crate::brain::SubstituteBrain;

/// The partner an execution ended up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartnerResult {
    /// No partner.
    None,
    /// Another live participant.
    Live(ActorId),
    /// A spawned substitute, owned by the execution.
    Substitute(ActorId),
}

impl PartnerResult {
    /// The partner actor, if any.
    #[must_use]
    pub fn actor(&self) -> Option<ActorId> {
        match *self {
            Self::None => None,
            Self::Live(actor) | Self::Substitute(actor) => Some(actor),
        }
    }

    /// The spawned substitute, if the partner is one.
    #[must_use]
    pub fn substitute(&self) -> Option<ActorId> {
        match *self {
            Self::Substitute(actor) => Some(actor),
            _ => None,
        }
    }

    /// Lowercase label for logs and reports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Live(_) => "live",
            Self::Substitute(_) => "substitute",
        }
    }
}

/// Result of partner resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PartnerResolution {
    /// Who the partner is.
    pub result: PartnerResult,
    /// Idle loop for a spawned substitute.
    pub brain: Option<SubstituteBrain>,
}

impl PartnerResolution {
    fn none() -> Self {
        Self {
            result: PartnerResult::None,
            brain: None,
        }
    }
}

/// Resolves a partner for `initiator` at `anchor`.
///
/// `candidates` are live participants the caller considers available, in
/// the directory's order; they are re-checked for liveness and range here.
/// Triggers that do not need a partner always resolve to
/// [`PartnerResult::None`].
pub fn resolve<H: ActorRig + ActorSpawner + ?Sized>(
    host: &mut H,
    tuning: &PipelineTuning,
    initiator: ActorId,
    definition: &TriggerDefinition,
    anchor: &AnchorDefinition,
    candidates: &[ActorId],
) -> PartnerResolution {
    if !definition.requires_partner() {
        return PartnerResolution::none();
    }
    let Some(origin) = host.pose(initiator).map(|pose| pose.position) else {
        warn!(%initiator, "initiator vanished before partner resolution");
        return PartnerResolution::none();
    };
    let radius = search_radius(definition, anchor);

    let live = candidates.iter().copied().find(|&candidate| {
        candidate != initiator
            && host
                .pose(candidate)
                .is_some_and(|pose| pose.position.distance(origin) <= radius)
    });
    if let Some(partner) = live {
        info!(%initiator, %partner, "live partner found");
        return PartnerResolution {
            result: PartnerResult::Live(partner),
            brain: None,
        };
    }

    let policy = &definition.partner;
    if !policy.allow_substitute {
        return PartnerResolution::none();
    }
    let spawn_at = farthest_spawn_point(anchor, origin);
    let rotation = facing(spawn_at, origin).unwrap_or(Quat::IDENTITY);
    let spawn_pose = Pose::new(spawn_at, rotation);
    let Some(substitute) = host.spawn_substitute(&policy.substitute_template, spawn_pose) else {
        warn!(template = %policy.substitute_template, "substitute spawn refused");
        return PartnerResolution::none();
    };
    info!(%initiator, %substitute, "substitute spawned");
    PartnerResolution {
        result: PartnerResult::Substitute(substitute),
        brain: Some(SubstituteBrain::new(
            substitute,
            initiator,
            anchor.pose,
            policy.substitute_behavior,
            tuning,
        )),
    }
}

/// Radius around the initiator that live partners must be within.
#[must_use]
pub fn search_radius(definition: &TriggerDefinition, anchor: &AnchorDefinition) -> f32 {
    definition
        .partner
        .search_radius
        .unwrap_or(anchor.partner_search_radius)
}

/// The configured spawn point farthest from `origin`; ties go to the first
/// listed point. Without spawn points the anchor's partner slot is used.
#[must_use]
pub fn farthest_spawn_point(anchor: &AnchorDefinition, origin: Vec3) -> Vec3 {
    let mut best: Option<(Vec3, f32)> = None;
    for &point in &anchor.spawn_points {
        let distance = point.distance(origin);
        if best.is_none_or(|(_, farthest)| distance > farthest) {
            best = Some((point, distance));
        }
    }
    best.map_or_else(|| anchor.partner_pose().position, |(point, _)| point)
}

#[cfg(test)]
mod tests {
    use encounter_content::domain::definitions::{
        AnimationMode, AnimationSpec, PartnerPolicy, PlaybackSpec,
    };
    use encounter_core::ids::{ClipId, TriggerId};
    use encounter_test_support::{FakeScene, SceneCall};

    use super::*;

    fn definition(mode: AnimationMode, allow_substitute: bool) -> TriggerDefinition {
        TriggerDefinition {
            id: TriggerId::from("high_five"),
            display_name: "High five".to_owned(),
            mode,
            playback: PlaybackSpec::Animation(AnimationSpec {
                clip: ClipId::from("high_five"),
                target_state: "Interaction".to_owned(),
                transition_time: 0.25,
                force_interrupt: false,
                placeholder_slot: "InteractionPlaceholder".to_owned(),
                partner: None,
            }),
            partner: PartnerPolicy {
                allow_substitute,
                ..PartnerPolicy::default()
            },
        }
    }

    fn anchor() -> AnchorDefinition {
        AnchorDefinition::new("plaza", Pose::IDENTITY)
    }

    #[test]
    fn test_live_partner_in_range_is_chosen_without_spawn() {
        // Arrange
        let mut scene = FakeScene::new();
        let initiator = scene.add_participant(Vec3::ZERO);
        let other = scene.add_participant(Vec3::new(1.0, 0.0, 0.0));
        let definition = definition(AnimationMode::PartnerPaired, true);

        // Act
        let resolution = resolve(
            &mut scene,
            &PipelineTuning::default(),
            initiator,
            &definition,
            &anchor(),
            &[initiator, other],
        );

        // Assert
        assert_eq!(resolution.result, PartnerResult::Live(other));
        assert!(resolution.brain.is_none());
        assert!(scene.spawned().is_empty());
    }

    #[test]
    fn test_first_candidate_in_range_wins() {
        let mut scene = FakeScene::new();
        let initiator = scene.add_participant(Vec3::ZERO);
        let farther = scene.add_participant(Vec3::new(2.5, 0.0, 0.0));
        let closer = scene.add_participant(Vec3::new(0.5, 0.0, 0.0));
        let definition = definition(AnimationMode::Synchronized, false);

        let resolution = resolve(
            &mut scene,
            &PipelineTuning::default(),
            initiator,
            &definition,
            &anchor(),
            &[farther, closer],
        );

        assert_eq!(resolution.result, PartnerResult::Live(farther));
    }

    #[test]
    fn test_out_of_range_candidate_is_ignored() {
        let mut scene = FakeScene::new();
        let initiator = scene.add_participant(Vec3::ZERO);
        let far = scene.add_participant(Vec3::new(10.0, 0.0, 0.0));
        let definition = definition(AnimationMode::PartnerPaired, false);

        let resolution = resolve(
            &mut scene,
            &PipelineTuning::default(),
            initiator,
            &definition,
            &anchor(),
            &[far],
        );

        assert_eq!(resolution.result, PartnerResult::None);
    }

    #[test]
    fn test_lone_initiator_without_substitution_gets_none() {
        let mut scene = FakeScene::new();
        let initiator = scene.add_participant(Vec3::ZERO);
        let definition = definition(AnimationMode::PartnerPaired, false);

        let resolution = resolve(
            &mut scene,
            &PipelineTuning::default(),
            initiator,
            &definition,
            &anchor(),
            &[initiator],
        );

        assert_eq!(resolution.result, PartnerResult::None);
        assert!(scene.spawned().is_empty());
    }

    #[test]
    fn test_substitute_spawns_at_farthest_point_facing_initiator() {
        // Arrange
        let mut scene = FakeScene::new();
        let initiator = scene.add_participant(Vec3::ZERO);
        let mut anchor = anchor();
        anchor.spawn_points = vec![
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -4.0),
            Vec3::new(2.0, 0.0, 0.0),
        ];
        let definition = definition(AnimationMode::PartnerPaired, true);

        // Act
        let resolution = resolve(
            &mut scene,
            &PipelineTuning::default(),
            initiator,
            &definition,
            &anchor,
            &[],
        );

        // Assert
        let PartnerResult::Substitute(substitute) = resolution.result else {
            panic!("expected a substitute, got {:?}", resolution.result);
        };
        let pose = scene.pose(substitute).unwrap();
        assert_eq!(pose.position, Vec3::new(0.0, 0.0, -4.0));
        let forward = pose.rotation * Vec3::Z;
        assert!((forward - Vec3::Z).length() < 1e-4);
        assert_eq!(resolution.brain.map(|b| b.actor()), Some(substitute));
    }

    #[test]
    fn test_spawn_point_ties_go_to_first_listed() {
        let mut anchor = anchor();
        anchor.spawn_points = vec![Vec3::new(3.0, 0.0, 0.0), Vec3::new(-3.0, 0.0, 0.0)];

        assert_eq!(
            farthest_spawn_point(&anchor, Vec3::ZERO),
            Vec3::new(3.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_without_spawn_points_partner_slot_is_used() {
        let anchor = anchor();

        let point = farthest_spawn_point(&anchor, Vec3::ZERO);

        assert_eq!(point, anchor.partner_pose().position);
    }

    #[test]
    fn test_refused_spawn_resolves_to_none() {
        let mut scene = FakeScene::new();
        let initiator = scene.add_participant(Vec3::ZERO);
        scene.refuse_spawns();
        let definition = definition(AnimationMode::PartnerPaired, true);

        let resolution = resolve(
            &mut scene,
            &PipelineTuning::default(),
            initiator,
            &definition,
            &anchor(),
            &[],
        );

        assert_eq!(resolution.result, PartnerResult::None);
    }

    #[test]
    fn test_single_actor_trigger_never_resolves_partner() {
        let mut scene = FakeScene::new();
        let initiator = scene.add_participant(Vec3::ZERO);
        let other = scene.add_participant(Vec3::X);
        let definition = definition(AnimationMode::SingleActor, true);

        let resolution = resolve(
            &mut scene,
            &PipelineTuning::default(),
            initiator,
            &definition,
            &anchor(),
            &[other],
        );

        assert_eq!(resolution.result, PartnerResult::None);
        assert_eq!(scene.count_calls(|c| matches!(c, SceneCall::Spawned { .. })), 0);
    }
}
