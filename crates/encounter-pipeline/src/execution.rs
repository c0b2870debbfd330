//! One execution, stepped once per tick.

use encounter_core::clock::Clock;
use encounter_core::host::{ActorRig, ParticipantDirectory, SceneHost};
use encounter_core::ids::{ActorId, AnchorId, ExecutionHandle, TriggerId};
use encounter_core::rng::DeterministicRng;
use encounter_core::routine::{Step, Tick};
use encounter_partner::brain::{IdleAction, SubstituteBrain};
use encounter_partner::prepare::PrepareForRole;
use encounter_partner::resolver::{self, PartnerResult};
use encounter_playback::context::{ExecutionContext, Phase, PlaybackNotice};
use encounter_playback::strategy::{self, Playback, PlaybackOutcome};
use encounter_staging::control_lock;
use encounter_staging::positioning::PositioningMove;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::completion::{ExecutionOutcome, ExecutionReport};
use crate::events::{
    BindingUnresolved, CancelRequested, EventStream, ExecutionEvent, ExecutionEventKind,
    ExecutionFinished, ExecutionRequested, PartnerResolved, PhaseEntered, PlaybackTimedOut,
};
use crate::restore::Restoration;

/// Read-only view of an active execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionSnapshot {
    pub handle: ExecutionHandle,
    pub trigger_id: TriggerId,
    pub anchor_id: AnchorId,
    pub initiator: ActorId,
    pub partner: Option<ActorId>,
    pub substituted: bool,
    pub phase: Phase,
    pub cancel_requested: bool,
}

/// Services an execution borrows from the orchestrator for one resume.
pub(crate) struct Env<'a> {
    pub(crate) clock: &'a dyn Clock,
    pub(crate) rng: &'a mut dyn DeterministicRng,
    /// Participants of the other active executions.
    pub(crate) busy: &'a [ActorId],
    pub(crate) events: &'a mut Vec<ExecutionEvent>,
}

#[derive(Debug)]
enum Stage {
    Resolve,
    Prepare(PrepareForRole),
    Position(PositioningMove),
    Play(Box<dyn Playback>),
    Restore(Restoration),
    Finished,
}

enum Transition {
    Resolve,
    Prepared,
    Positioned,
    Played(PlaybackOutcome),
    Restored,
}

#[derive(Debug)]
pub(crate) struct Execution {
    ctx: ExecutionContext,
    stage: Stage,
    brain: Option<SubstituteBrain>,
    outcome: Option<ExecutionOutcome>,
    stream: EventStream,
}

impl Execution {
    /// Wraps an approved context and records the request event.
    pub(crate) fn start(
        ctx: ExecutionContext,
        clock: &dyn Clock,
        events: &mut Vec<ExecutionEvent>,
    ) -> Self {
        let mut stream = EventStream::new(ctx.handle);
        events.push(stream.record(
            clock,
            ExecutionEventKind::ExecutionRequested(ExecutionRequested {
                trigger_id: ctx.definition.id.clone(),
                anchor_id: ctx.anchor.id.clone(),
                initiator: ctx.initiator,
            }),
        ));
        info!(
            handle = %ctx.handle,
            trigger = %ctx.definition.id,
            anchor = %ctx.anchor.id,
            initiator = %ctx.initiator,
            "execution requested"
        );
        Self {
            ctx,
            stage: Stage::Resolve,
            brain: None,
            outcome: None,
            stream,
        }
    }

    pub(crate) fn handle(&self) -> ExecutionHandle {
        self.ctx.handle
    }

    pub(crate) fn anchor_id(&self) -> &AnchorId {
        &self.ctx.anchor.id
    }

    pub(crate) fn phase(&self) -> Phase {
        self.ctx.phase
    }

    /// The initiator, plus the partner once resolved.
    pub(crate) fn participants(&self) -> Vec<ActorId> {
        self.ctx.participants()
    }

    pub(crate) fn involves(&self, actor: ActorId) -> bool {
        self.ctx.involves(actor)
    }

    /// Flags the execution for cancellation. Returns `false` when the
    /// request is ignored because the unwind is already running or a cancel
    /// is already pending.
    pub(crate) fn request_cancel(
        &mut self,
        clock: &dyn Clock,
        events: &mut Vec<ExecutionEvent>,
    ) -> bool {
        if self.ctx.phase.is_unwinding() || self.ctx.cancel_requested {
            return false;
        }
        self.ctx.cancel_requested = true;
        events.push(self.stream.record(
            clock,
            ExecutionEventKind::CancelRequested(CancelRequested {
                phase: self.ctx.phase,
            }),
        ));
        info!(handle = %self.ctx.handle, phase = self.ctx.phase.as_str(), "cancel requested");
        true
    }

    pub(crate) fn snapshot(&self) -> ExecutionSnapshot {
        ExecutionSnapshot {
            handle: self.ctx.handle,
            trigger_id: self.ctx.definition.id.clone(),
            anchor_id: self.ctx.anchor.id.clone(),
            initiator: self.ctx.initiator,
            partner: self.ctx.partner.actor(),
            substituted: self.ctx.partner.substitute().is_some(),
            phase: self.ctx.phase,
            cancel_requested: self.ctx.cancel_requested,
        }
    }

    /// Report for the completion listener. Only meaningful once finished.
    pub(crate) fn report(&self) -> ExecutionReport {
        ExecutionReport {
            handle: self.ctx.handle,
            trigger_id: self.ctx.definition.id.clone(),
            anchor_id: self.ctx.anchor.id.clone(),
            initiator: self.ctx.initiator,
            partner: self.ctx.partner.actor(),
            substituted: self.ctx.partner.substitute().is_some(),
            outcome: self.outcome.unwrap_or(ExecutionOutcome::Cancelled),
        }
    }

    /// Advances the execution by one tick.
    pub(crate) fn resume(
        &mut self,
        host: &mut dyn SceneHost,
        env: &mut Env<'_>,
        tick: Tick,
    ) -> Step<ExecutionOutcome> {
        if self.ctx.cancel_requested && !self.ctx.phase.is_unwinding() {
            self.enter(Phase::Cancelling, env);
            self.outcome = Some(ExecutionOutcome::Cancelled);
            self.begin_restore(env);
        }
        self.tick_brain(host, env, tick);

        let mut tick = tick;
        loop {
            let transition = match &mut self.stage {
                Stage::Resolve => Transition::Resolve,
                Stage::Prepare(prepare) => match prepare.resume(host, tick) {
                    Step::Pending => return Step::Pending,
                    Step::Ready(()) => Transition::Prepared,
                },
                Stage::Position(movement) => match movement.resume(host, tick) {
                    Step::Pending => return Step::Pending,
                    Step::Ready(()) => Transition::Positioned,
                },
                Stage::Play(playback) => {
                    let step = playback.resume(&mut self.ctx, host, tick);
                    self.flush_notices(env);
                    match step {
                        Step::Pending => return Step::Pending,
                        Step::Ready(outcome) => Transition::Played(outcome),
                    }
                }
                Stage::Restore(restoration) => match restoration.resume(&mut self.ctx, host, tick) {
                    Step::Pending => return Step::Pending,
                    Step::Ready(()) => Transition::Restored,
                },
                Stage::Finished => {
                    return Step::Ready(self.outcome.unwrap_or(ExecutionOutcome::Cancelled));
                }
            };
            self.apply(transition, host, env);
            tick = tick.settle();
        }
    }

    fn apply(&mut self, transition: Transition, host: &mut dyn SceneHost, env: &mut Env<'_>) {
        match transition {
            Transition::Resolve => self.resolve_partner(host, env),
            Transition::Prepared => self.begin_positioning(host, env),
            Transition::Positioned => self.begin_playing(env),
            Transition::Played(outcome) => {
                self.outcome = Some(match outcome {
                    PlaybackOutcome::Finished => ExecutionOutcome::Completed,
                    PlaybackOutcome::TimedOut => ExecutionOutcome::CompletedAfterTimeout,
                });
                self.begin_restore(env);
            }
            Transition::Restored => self.finish(env),
        }
    }

    fn resolve_partner(&mut self, host: &mut dyn SceneHost, env: &mut Env<'_>) {
        self.enter(Phase::ResolvingPartner, env);
        let candidates = self.candidates(&*host, env.busy);
        let resolution = resolver::resolve(
            host,
            &self.ctx.tuning,
            self.ctx.initiator,
            &self.ctx.definition,
            &self.ctx.anchor,
            &candidates,
        );
        self.ctx.partner = resolution.result;
        self.brain = resolution.brain;
        self.record(
            env,
            ExecutionEventKind::PartnerResolved(PartnerResolved {
                partner: self.ctx.partner.actor(),
                kind: self.ctx.partner.label().to_owned(),
            }),
        );

        if self.ctx.definition.requires_partner() && self.ctx.partner.actor().is_none() {
            warn!(
                handle = %self.ctx.handle,
                trigger = %self.ctx.definition.id,
                "no partner available"
            );
            self.outcome = Some(ExecutionOutcome::NoPartnerAvailable);
            self.begin_restore(env);
            return;
        }
        match self.ctx.partner {
            PartnerResult::Substitute(substitute) => {
                let slot = self.ctx.anchor.partner_pose();
                self.stage = Stage::Prepare(PrepareForRole::new(substitute, slot, &self.ctx.tuning));
            }
            PartnerResult::Live(_) | PartnerResult::None => self.begin_positioning(host, env),
        }
    }

    /// Live participants near the initiator that no other execution holds.
    fn candidates(&self, host: &dyn SceneHost, busy: &[ActorId]) -> Vec<ActorId> {
        let Some(origin) = host.pose(self.ctx.initiator) else {
            return Vec::new();
        };
        let radius = resolver::search_radius(&self.ctx.definition, &self.ctx.anchor);
        host.participants_near(origin.position, radius)
            .into_iter()
            .filter(|actor| !busy.contains(actor))
            .collect()
    }

    fn begin_positioning(&mut self, host: &mut dyn SceneHost, env: &mut Env<'_>) {
        self.enter(Phase::Positioning, env);
        let participants = self.ctx.participants();
        let disabled = control_lock::acquire(host, &participants);
        debug!(handle = %self.ctx.handle, locked = disabled.len(), "control lock acquired");
        self.ctx.disabled = Some(disabled);
        self.ctx.flags.is_interacting = true;

        let mut movement = PositioningMove::new(self.ctx.tuning.positioning_duration)
            .with_actor(self.ctx.initiator, self.ctx.anchor.initiator_pose());
        if let Some(partner) = self.ctx.partner.actor() {
            movement = movement.with_actor(partner, self.ctx.anchor.partner_pose());
        }
        self.stage = Stage::Position(movement);
    }

    fn begin_playing(&mut self, env: &mut Env<'_>) {
        self.enter(Phase::Playing, env);
        self.ctx.flags.is_executing_trigger = true;
        self.stage = Stage::Play(strategy::select(&self.ctx.definition));
    }

    fn begin_restore(&mut self, env: &mut Env<'_>) {
        self.enter(Phase::Restoring, env);
        self.ctx.flags.is_executing_trigger = false;
        self.stage = Stage::Restore(Restoration::new());
    }

    fn finish(&mut self, env: &mut Env<'_>) {
        let outcome = self.outcome.unwrap_or(ExecutionOutcome::Cancelled);
        let phase = if outcome == ExecutionOutcome::Cancelled {
            Phase::Cancelled
        } else {
            Phase::Completed
        };
        self.enter(phase, env);
        self.record(
            env,
            ExecutionEventKind::ExecutionFinished(ExecutionFinished { outcome }),
        );
        self.ctx.flags.is_interacting = false;
        self.brain = None;
        self.stage = Stage::Finished;
        info!(
            handle = %self.ctx.handle,
            trigger = %self.ctx.definition.id,
            outcome = outcome.as_str(),
            "execution finished"
        );
    }

    fn tick_brain(&mut self, host: &mut dyn SceneHost, env: &mut Env<'_>, tick: Tick) {
        let Some(brain) = self.brain.as_mut() else {
            return;
        };
        if !host.is_alive(brain.actor()) {
            return;
        }
        if let IdleAction::Gestured(gesture) = brain.tick(host, self.ctx.flags, env.rng, tick) {
            debug!(handle = %self.ctx.handle, actor = %brain.actor(), %gesture, "substitute gestured");
        }
    }

    fn flush_notices(&mut self, env: &mut Env<'_>) {
        for notice in std::mem::take(&mut self.ctx.notices) {
            let kind = match notice {
                PlaybackNotice::BindingUnresolved { track } => {
                    ExecutionEventKind::BindingUnresolved(BindingUnresolved { track })
                }
                PlaybackNotice::TimedOut { after } => {
                    ExecutionEventKind::PlaybackTimedOut(PlaybackTimedOut {
                        after_seconds: after,
                    })
                }
            };
            self.record(env, kind);
        }
    }

    fn enter(&mut self, phase: Phase, env: &mut Env<'_>) {
        if self.ctx.phase == phase {
            return;
        }
        debug!(
            handle = %self.ctx.handle,
            from = self.ctx.phase.as_str(),
            to = phase.as_str(),
            "phase entered"
        );
        self.ctx.phase = phase;
        self.record(env, ExecutionEventKind::PhaseEntered(PhaseEntered { phase }));
    }

    fn record(&mut self, env: &mut Env<'_>, kind: ExecutionEventKind) {
        env.events.push(self.stream.record(env.clock, kind));
    }
}

