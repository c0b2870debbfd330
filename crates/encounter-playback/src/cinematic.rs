//! Cinematic playback.
//!
//! Loads and binds the sequence, raises the primary shot camera, hands IK
//! influence to the sequence, plays until the sequence ends (or holds for a
//! fixed time when no sequence is configured), then lowers the camera,
//! hands IK back and clears the bindings. Everything it creates is recorded
//! in the context, so a cancelled cinematic is unwound from there.

use encounter_content::domain::definitions::CinematicSpec;
use encounter_core::host::SceneHost;
use encounter_core::routine::{Step, Tick, Wait};
use encounter_staging::ik::IkBlendSet;
use tracing::{debug, warn};

use crate::binding::{bind_sequence, ensure_shot_camera, shot_for};
use crate::context::{ExecutionContext, PlaybackNotice};
use crate::strategy::{Playback, PlaybackOutcome};

#[derive(Debug, Clone, PartialEq)]
enum Stage {
    Start,
    CameraIn(Wait),
    IkDown(IkBlendSet),
    Play { elapsed: f32, timeout: f32 },
    Hold(Wait),
    CameraOut(Wait, PlaybackOutcome),
    IkUp(IkBlendSet, PlaybackOutcome),
    Done(PlaybackOutcome),
}

/// Plays a [`CinematicSpec`].
#[derive(Debug, Clone, PartialEq)]
pub struct CinematicPlayback {
    spec: CinematicSpec,
    stage: Stage,
}

impl CinematicPlayback {
    /// Creates the strategy; nothing happens until the first resume.
    #[must_use]
    pub fn new(spec: CinematicSpec) -> Self {
        Self {
            spec,
            stage: Stage::Start,
        }
    }
}

impl Playback for CinematicPlayback {
    fn resume(
        &mut self,
        ctx: &mut ExecutionContext,
        host: &mut dyn SceneHost,
        tick: Tick,
    ) -> Step<PlaybackOutcome> {
        let mut tick = tick;
        loop {
            let next = match &mut self.stage {
                Stage::Start => start(&self.spec, ctx, host),
                Stage::CameraIn(wait) => match wait.resume(tick) {
                    Step::Pending => return Step::Pending,
                    Step::Ready(()) => begin_ik(&self.spec, ctx, host),
                },
                Stage::IkDown(blends) => match blends.resume(host, tick) {
                    Step::Pending => return Step::Pending,
                    Step::Ready(()) => begin_play(&self.spec, ctx, host),
                },
                Stage::Play { elapsed, timeout } => {
                    *elapsed += tick.delta;
                    let Some(instance) = ctx.sequence else {
                        return Step::Ready(PlaybackOutcome::Finished);
                    };
                    if host.is_finished(instance) {
                        finish(ctx, host, PlaybackOutcome::Finished)
                    } else if *elapsed >= *timeout {
                        warn!(handle = %ctx.handle, after = *elapsed, "sequence timed out");
                        ctx.notices.push(PlaybackNotice::TimedOut { after: *elapsed });
                        finish(ctx, host, PlaybackOutcome::TimedOut)
                    } else {
                        return Step::Pending;
                    }
                }
                Stage::Hold(wait) => match wait.resume(tick) {
                    Step::Pending => return Step::Pending,
                    Step::Ready(()) => finish(ctx, host, PlaybackOutcome::Finished),
                },
                Stage::CameraOut(wait, outcome) => match wait.resume(tick) {
                    Step::Pending => return Step::Pending,
                    Step::Ready(()) => {
                        let blends = ctx.ik.restore_blends(ctx.tuning.ik_blend_duration);
                        Stage::IkUp(blends, *outcome)
                    }
                },
                Stage::IkUp(blends, outcome) => match blends.resume(host, tick) {
                    Step::Pending => return Step::Pending,
                    Step::Ready(()) => {
                        ctx.ik.clear();
                        let cleared = ctx.bindings.clear(host);
                        debug!(handle = %ctx.handle, cleared, "cinematic finished");
                        Stage::Done(*outcome)
                    }
                },
                Stage::Done(outcome) => return Step::Ready(*outcome),
            };
            self.stage = next;
            tick = tick.settle();
        }
    }
}

fn start(spec: &CinematicSpec, ctx: &mut ExecutionContext, host: &mut dyn SceneHost) -> Stage {
    if let Some(asset) = &spec.sequence {
        if let Some(instance) = host.load_sequence(asset) {
            ctx.sequence = Some(instance);
            let bound = bind_sequence(host, ctx, instance);
            debug!(handle = %ctx.handle, %asset, bound, "sequence loaded");
        } else {
            warn!(handle = %ctx.handle, %asset, "sequence failed to load, holding instead");
        }
    }

    if spec.activate_camera && !spec.shots.is_empty() {
        let descriptor = shot_for(ctx, 0);
        if let Some(camera) = ensure_shot_camera(host, ctx, 0, descriptor) {
            let blend = ctx.tuning.camera_blend_duration;
            return Stage::CameraIn(ctx.camera.activate(host, camera, blend));
        }
        warn!(handle = %ctx.handle, "primary shot camera could not be spawned");
    }
    begin_ik(spec, ctx, host)
}

fn begin_ik(spec: &CinematicSpec, ctx: &mut ExecutionContext, host: &mut dyn SceneHost) -> Stage {
    if !spec.blend_ik {
        return begin_play(spec, ctx, host);
    }
    for actor in ctx.participants() {
        ctx.ik.record(&*host, actor);
    }
    Stage::IkDown(
        ctx.ik
            .blend_all(ctx.tuning.ik_playback_weight, ctx.tuning.ik_blend_duration),
    )
}

fn begin_play(spec: &CinematicSpec, ctx: &mut ExecutionContext, host: &mut dyn SceneHost) -> Stage {
    match ctx.sequence {
        Some(instance) => {
            host.play(instance);
            let timeout = ctx.tuning.cinematic_timeout(host.duration(instance));
            Stage::Play {
                elapsed: 0.0,
                timeout,
            }
        }
        None => Stage::Hold(Wait::seconds(spec.fallback_duration)),
    }
}

fn finish(ctx: &mut ExecutionContext, host: &mut dyn SceneHost, outcome: PlaybackOutcome) -> Stage {
    let blend = ctx.tuning.camera_blend_duration;
    Stage::CameraOut(ctx.camera.deactivate(host, blend), outcome)
}
