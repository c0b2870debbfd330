//! Direct animation playback.
//!
//! Each animated actor gets the trigger's clip in its placeholder slot and
//! cross-fades into the target state. Playback is finished once every actor
//! sits in its target state past the completion threshold. A safety timeout
//! derived from the clip length ends a stuck animation instead.

use encounter_content::domain::definitions::{AnimationMode, AnimationSpec};
use encounter_core::host::SceneHost;
use encounter_core::ids::{ActorId, ClipId};
use encounter_core::routine::{Step, Tick};
use tracing::{debug, warn};

use crate::context::{ExecutionContext, PlaybackNotice};
use crate::strategy::{Playback, PlaybackOutcome};

#[derive(Debug, Clone, PartialEq)]
struct AnimatedActor {
    actor: ActorId,
    target_state: String,
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Start,
    Running {
        actors: Vec<AnimatedActor>,
        elapsed: f32,
        timeout: f32,
    },
}

/// Plays an [`AnimationSpec`] through animator override slots.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectAnimation {
    spec: AnimationSpec,
    state: State,
}

impl DirectAnimation {
    /// Creates the strategy; nothing happens until the first resume.
    #[must_use]
    pub fn new(spec: AnimationSpec) -> Self {
        Self {
            spec,
            state: State::Start,
        }
    }

    /// Who plays which clip into which state.
    fn casting(&self, ctx: &ExecutionContext) -> Vec<(ActorId, ClipId, String)> {
        let mut casting = vec![(
            ctx.initiator,
            self.spec.clip.clone(),
            self.spec.target_state.clone(),
        )];
        if ctx.definition.mode != AnimationMode::SingleActor {
            if let Some(partner) = ctx.partner.actor() {
                let (clip, state) = self.spec.partner.as_ref().map_or_else(
                    || (self.spec.clip.clone(), self.spec.target_state.clone()),
                    |paired| (paired.clip.clone(), paired.target_state.clone()),
                );
                casting.push((partner, clip, state));
            }
        }
        casting
    }

    fn start(&self, ctx: &mut ExecutionContext, host: &mut dyn SceneHost) -> State {
        let mut actors = Vec::new();
        let mut longest: Option<f32> = None;
        for (actor, clip, target_state) in self.casting(ctx) {
            if !host.has_animator(actor) {
                warn!(handle = %ctx.handle, %actor, "actor has no animator, skipping");
                continue;
            }
            if !host.override_clip(actor, &self.spec.placeholder_slot, &clip) {
                warn!(handle = %ctx.handle, %actor, %clip, "clip override rejected, skipping");
                continue;
            }
            if !ctx.overridden.contains(&actor) {
                ctx.overridden.push(actor);
            }
            host.cross_fade(
                actor,
                &target_state,
                self.spec.transition_time,
                self.spec.force_interrupt,
            );
            if let Some(length) = host.clip_length(&clip) {
                longest = Some(longest.map_or(length, |l| l.max(length)));
            }
            actors.push(AnimatedActor {
                actor,
                target_state,
            });
        }
        let timeout = ctx.tuning.animation_timeout(longest);
        debug!(handle = %ctx.handle, animated = actors.len(), timeout, "direct animation started");
        State::Running {
            actors,
            elapsed: 0.0,
            timeout,
        }
    }
}

impl Playback for DirectAnimation {
    fn resume(
        &mut self,
        ctx: &mut ExecutionContext,
        host: &mut dyn SceneHost,
        tick: Tick,
    ) -> Step<PlaybackOutcome> {
        let mut tick = tick;
        if self.state == State::Start {
            self.state = self.start(ctx, host);
            tick = tick.settle();
        }
        let State::Running {
            actors,
            elapsed,
            timeout,
        } = &mut self.state
        else {
            return Step::Pending;
        };
        *elapsed += tick.delta;

        let threshold = ctx.tuning.completion_threshold;
        let finished = actors.iter().all(|animated| {
            host.animator_state(animated.actor).is_some_and(|state| {
                state.state == animated.target_state && state.normalized_time >= threshold
            })
        });
        if finished {
            return Step::Ready(PlaybackOutcome::Finished);
        }
        if *elapsed >= *timeout {
            warn!(handle = %ctx.handle, after = *elapsed, "animation timed out");
            ctx.notices.push(PlaybackNotice::TimedOut { after: *elapsed });
            return Step::Ready(PlaybackOutcome::TimedOut);
        }
        Step::Pending
    }
}

/// Builds a context around `spec` for strategy tests.
#[cfg(test)]
pub(crate) fn test_context(
    spec: encounter_content::domain::definitions::PlaybackSpec,
    mode: AnimationMode,
    initiator: ActorId,
) -> ExecutionContext {
    use std::sync::Arc;

    use encounter_content::domain::anchors::AnchorDefinition;
    use encounter_content::domain::definitions::{PartnerPolicy, TriggerDefinition};
    use encounter_content::domain::tuning::PipelineTuning;
    use encounter_core::ids::{ExecutionHandle, TriggerId};
    use encounter_core::pose::Pose;

    let definition = TriggerDefinition {
        id: TriggerId::from("test"),
        display_name: "Test".to_owned(),
        mode,
        playback: spec,
        partner: PartnerPolicy::default(),
    };
    ExecutionContext::new(
        ExecutionHandle::new(),
        Arc::new(definition),
        Arc::new(AnchorDefinition::new("anchor", Pose::IDENTITY)),
        Arc::new(PipelineTuning::default()),
        initiator,
    )
}
