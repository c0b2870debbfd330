//! Playback Strategy contract and selection.

use encounter_content::domain::definitions::{PlaybackSpec, TriggerDefinition};
use encounter_core::host::SceneHost;
use encounter_core::routine::{Step, Tick};

use crate::cinematic::CinematicPlayback;
use crate::context::ExecutionContext;
use crate::direct::DirectAnimation;

/// How playback ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// The content played to completion.
    Finished,
    /// The safety timeout fired first. Not fatal; the execution still
    /// completes.
    TimedOut,
}

/// A way of playing a trigger's content, resumed once per tick.
///
/// A strategy records every resource it creates in the context, so an
/// execution cancelled mid-playback can be unwound without the strategy's
/// help.
pub trait Playback: Send + std::fmt::Debug {
    /// Advances playback.
    fn resume(
        &mut self,
        ctx: &mut ExecutionContext,
        host: &mut dyn SceneHost,
        tick: Tick,
    ) -> Step<PlaybackOutcome>;
}

/// Picks the strategy for a definition.
#[must_use]
pub fn select(definition: &TriggerDefinition) -> Box<dyn Playback> {
    match &definition.playback {
        PlaybackSpec::Animation(spec) => Box::new(DirectAnimation::new(spec.clone())),
        PlaybackSpec::Cinematic(spec) => Box::new(CinematicPlayback::new(spec.clone())),
    }
}
