//! The restoration unwind.
//!
//! Every way out of an execution ends here. The routine is driven entirely
//! by what the context recorded, and every ledger is emptied as it is
//! processed, so restoring a context whose playback already cleaned up
//! after itself only does what is left.
//!
//! Order: sequence and bindings, animator overrides, shot camera priority,
//! IK weights, control lock, shot cameras, substitute.

use encounter_core::host::{ActorRig, ActorSpawner, AnimationDriver, CameraRig, SceneHost, SequenceDirector};
use encounter_core::routine::{Step, Tick, Wait};
use encounter_playback::context::ExecutionContext;
use encounter_staging::control_lock;
use encounter_staging::ik::IkBlendSet;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
enum Stage {
    Begin,
    CameraOut(Wait),
    IkUp(IkBlendSet),
    Release,
    Done,
}

/// Unwind routine for one context.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Restoration {
    stage: Stage,
}

impl Restoration {
    pub(crate) fn new() -> Self {
        Self {
            stage: Stage::Begin,
        }
    }

    pub(crate) fn resume(
        &mut self,
        ctx: &mut ExecutionContext,
        host: &mut dyn SceneHost,
        tick: Tick,
    ) -> Step {
        let mut tick = tick;
        loop {
            let next = match &mut self.stage {
                Stage::Begin => {
                    stop_content(ctx, host);
                    let blend = ctx.tuning.camera_blend_duration;
                    Stage::CameraOut(ctx.camera.deactivate(host, blend))
                }
                Stage::CameraOut(wait) => match wait.resume(tick) {
                    Step::Pending => return Step::Pending,
                    Step::Ready(()) => {
                        Stage::IkUp(ctx.ik.take_restore_blends(ctx.tuning.ik_blend_duration))
                    }
                },
                Stage::IkUp(blends) => match blends.resume(host, tick) {
                    Step::Pending => return Step::Pending,
                    Step::Ready(()) => Stage::Release,
                },
                Stage::Release => {
                    release_resources(ctx, host);
                    Stage::Done
                }
                Stage::Done => return Step::Ready(()),
            };
            self.stage = next;
            tick = tick.settle();
        }
    }
}

fn stop_content(ctx: &mut ExecutionContext, host: &mut dyn SceneHost) {
    let cleared = ctx.bindings.clear(host);
    if let Some(instance) = ctx.sequence.take() {
        SequenceDirector::stop(host, instance);
        debug!(handle = %ctx.handle, %instance, cleared, "sequence stopped");
    }
    for actor in ctx.overridden.drain(..) {
        host.clear_overrides(actor);
    }
}

fn release_resources(ctx: &mut ExecutionContext, host: &mut dyn SceneHost) {
    if let Some(disabled) = ctx.disabled.take() {
        control_lock::release(host, disabled);
    }
    for shot in ctx.shot_cameras.drain(..) {
        host.despawn_shot(shot.camera);
    }
    if let Some(substitute) = ctx.partner.substitute() {
        if host.is_alive(substitute) {
            host.despawn(substitute);
            debug!(handle = %ctx.handle, %substitute, "substitute despawned");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use encounter_content::domain::anchors::AnchorDefinition;
    use encounter_content::domain::definitions::{
        AnimationMode, CinematicSpec, PartnerPolicy, PlaybackSpec, TriggerDefinition,
    };
    use encounter_content::domain::tuning::PipelineTuning;
    use encounter_core::ids::{ClipId, ExecutionHandle, SequenceAssetId, TriggerId};
    use encounter_core::pose::Pose;
    use encounter_core::shot::{CameraShotDescriptor, ShotPlacement};
    use encounter_partner::resolver::PartnerResult;
    use encounter_playback::binding::bind_sequence;
    use encounter_test_support::{FakeScene, SceneCall};
    use glam::Vec3;

    use super::*;

    fn context(scene: &mut FakeScene) -> ExecutionContext {
        let initiator = scene.add_participant(Vec3::ZERO);
        let definition = TriggerDefinition {
            id: TriggerId::from("bow"),
            display_name: "Bow".to_owned(),
            mode: AnimationMode::PartnerPaired,
            playback: PlaybackSpec::Cinematic(CinematicSpec {
                sequence: Some(SequenceAssetId::from("bow_seq")),
                shots: Vec::new(),
                fallback_duration: 1.0,
                activate_camera: true,
                blend_ik: true,
            }),
            partner: PartnerPolicy::default(),
        };
        ExecutionContext::new(
            ExecutionHandle::new(),
            Arc::new(definition),
            Arc::new(AnchorDefinition::new("stage", Pose::IDENTITY)),
            Arc::new(PipelineTuning::default()),
            initiator,
        )
    }

    fn run(scene: &mut FakeScene, restoration: &mut Restoration, ctx: &mut ExecutionContext) {
        for index in 0..100 {
            if restoration.resume(ctx, scene, Tick::new(index, 0.25)).is_ready() {
                return;
            }
            scene.advance(0.25);
        }
        panic!("restoration did not finish");
    }

    /// Mid-playback state: sequence bound and playing, camera raised, IK
    /// lowered, lock held, clip overridden, substitute partner.
    fn mid_playback(scene: &mut FakeScene) -> ExecutionContext {
        scene.add_sequence_asset("bow_seq", &["Player", "Partner"], Some(5.0));
        let mut ctx = context(scene);
        let substitute = scene.spawn_substitute("npc", Pose::at(Vec3::X)).unwrap();
        ctx.partner = PartnerResult::Substitute(substitute);

        let instance = scene.load_sequence(&SequenceAssetId::from("bow_seq")).unwrap();
        ctx.sequence = Some(instance);
        bind_sequence(scene, &mut ctx, instance);
        scene.play(instance);

        let camera = scene
            .spawn_shot(&ShotPlacement {
                descriptor: CameraShotDescriptor::named("wide"),
                anchor: Pose::IDENTITY,
            })
            .unwrap();
        ctx.shot_cameras.push(encounter_playback::context::ShotCamera { index: 0, camera });
        let _ = ctx.camera.activate(scene, camera, 1.0);

        for actor in ctx.participants() {
            ctx.ik.record(&*scene, actor);
            scene.set_ik_weight(actor, 0.0);
        }
        ctx.disabled = Some(control_lock::acquire(scene, &ctx.participants()));
        scene.override_clip(ctx.initiator, "Slot", &ClipId::from("bow"));
        ctx.overridden.push(ctx.initiator);
        ctx
    }

    #[test]
    fn test_restoration_unwinds_everything_recorded() {
        // Arrange
        let mut scene = FakeScene::new();
        let mut ctx = mid_playback(&mut scene);
        let initiator = ctx.initiator;
        let substitute = ctx.partner.substitute().unwrap();
        scene.calls.clear();

        // Act
        run(&mut scene, &mut Restoration::new(), &mut ctx);

        // Assert
        assert_eq!(scene.sequence_count(), 0);
        assert_eq!(scene.camera_count(), 0);
        assert!(!scene.is_alive(substitute));
        assert!(scene.capabilities(initiator).iter().all(|c| c.enabled));
        assert!((scene.ik_weight(initiator).unwrap() - 1.0).abs() < f32::EPSILON);
        assert!(scene.actor(initiator).unwrap().animator.as_ref().unwrap().overrides.is_empty());
        assert!(ctx.disabled.is_none());
        assert!(ctx.bindings.is_empty());
    }

    #[test]
    fn test_restoration_order_is_fixed() {
        // Arrange
        let mut scene = FakeScene::new();
        let mut ctx = mid_playback(&mut scene);
        scene.calls.clear();

        // Act
        run(&mut scene, &mut Restoration::new(), &mut ctx);

        // Assert
        let position = |predicate: &dyn Fn(&SceneCall) -> bool| {
            scene.calls.iter().position(|c| predicate(c)).unwrap()
        };
        let cleared = position(&|c| matches!(c, SceneCall::TrackCleared { .. }));
        let stopped = position(&|c| matches!(c, SceneCall::SequenceStopped { .. }));
        let overrides = position(&|c| matches!(c, SceneCall::OverridesCleared { .. }));
        let priority = position(&|c| matches!(c, SceneCall::PrioritySet { .. }));
        let ik = position(&|c| matches!(c, SceneCall::IkWeightSet { .. }));
        let unlock = position(&|c| matches!(c, SceneCall::CapabilityToggled { enabled: true, .. }));
        let camera = position(&|c| matches!(c, SceneCall::ShotDespawned { .. }));
        let despawn = position(&|c| matches!(c, SceneCall::Despawned { .. }));
        assert!(cleared < stopped);
        assert!(stopped < overrides);
        assert!(overrides < priority);
        assert!(priority < ik);
        assert!(ik < unlock);
        assert!(unlock < camera);
        assert!(camera < despawn);
    }

    #[test]
    fn test_second_restoration_does_nothing() {
        let mut scene = FakeScene::new();
        let mut ctx = mid_playback(&mut scene);
        run(&mut scene, &mut Restoration::new(), &mut ctx);
        scene.calls.clear();

        run(&mut scene, &mut Restoration::new(), &mut ctx);

        assert!(scene.calls.is_empty());
    }
}
