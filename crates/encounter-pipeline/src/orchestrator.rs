//! Trigger Execution Orchestrator.
//!
//! Owns every active execution, admits new ones, and advances them once per
//! [`TriggerOrchestrator::tick`]. Requests are validated up front and
//! rejected without side effects; nothing touches the scene until the next
//! tick. Executions on different anchors share no state and are resumed in
//! the order they were admitted.

use std::sync::Arc;

use encounter_content::application::catalog::TriggerCatalog;
use encounter_content::application::query_handlers;
use encounter_content::domain::definitions::TriggerDefinition;
use encounter_content::domain::tuning::PipelineTuning;
use encounter_core::clock::Clock;
use encounter_core::error::PipelineError;
use encounter_core::host::SceneHost;
use encounter_core::ids::{ActorId, AnchorId, ExecutionHandle, TriggerId};
use encounter_core::rng::DeterministicRng;
use encounter_core::routine::{Step, Tick};
use encounter_playback::context::{ExecutionContext, Phase};
use tracing::{info, warn};

use crate::completion::CompletionListener;
use crate::events::ExecutionEvent;
use crate::execution::{Env, Execution, ExecutionSnapshot};

/// Services injected into the orchestrator.
pub struct PipelineServices {
    /// Timestamps events.
    pub clock: Box<dyn Clock>,
    /// Drives substitute idle behavior.
    pub rng: Box<dyn DeterministicRng>,
    /// Receives one report per finished execution.
    pub listener: Box<dyn CompletionListener>,
}

/// Admits, drives and reports trigger executions.
pub struct TriggerOrchestrator {
    catalog: Arc<TriggerCatalog>,
    tuning: Arc<PipelineTuning>,
    services: PipelineServices,
    executions: Vec<Execution>,
    events: Vec<ExecutionEvent>,
    tick_index: u64,
}

impl TriggerOrchestrator {
    /// Creates an orchestrator over a loaded catalog.
    #[must_use]
    pub fn new(catalog: Arc<TriggerCatalog>, services: PipelineServices) -> Self {
        let tuning = Arc::new(catalog.tuning().clone());
        Self {
            catalog,
            tuning,
            services,
            executions: Vec::new(),
            events: Vec::new(),
            tick_index: 0,
        }
    }

    /// The catalog executions are drawn from.
    #[must_use]
    pub fn catalog(&self) -> &TriggerCatalog {
        &self.catalog
    }

    /// Admits an execution of `trigger_id` at `anchor_id` for `initiator`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::AnchorNotFound`, `TriggerNotFound` or
    /// `TriggerNotOffered` for requests the catalog cannot satisfy,
    /// `AlreadyExecuting` when the anchor is occupied, and
    /// `ParticipantBusy` when the initiator takes part in another
    /// execution. A rejected request changes nothing.
    pub fn execute(
        &mut self,
        trigger_id: &TriggerId,
        anchor_id: &AnchorId,
        initiator: ActorId,
    ) -> Result<ExecutionHandle, PipelineError> {
        let anchor = Arc::clone(
            self.catalog
                .anchor(anchor_id)
                .ok_or_else(|| PipelineError::AnchorNotFound(anchor_id.clone()))?,
        );
        let definition = Arc::clone(
            self.catalog
                .trigger(trigger_id)
                .ok_or_else(|| PipelineError::TriggerNotFound(trigger_id.clone()))?,
        );
        if !anchor.offers(trigger_id) {
            return Err(PipelineError::TriggerNotOffered {
                trigger: trigger_id.clone(),
                anchor: anchor_id.clone(),
            });
        }
        if self.active_execution(anchor_id).is_some() {
            warn!(anchor = %anchor_id, trigger = %trigger_id, "anchor already executing");
            return Err(PipelineError::AlreadyExecuting(anchor_id.clone()));
        }
        if self.is_busy(initiator) {
            warn!(%initiator, anchor = %anchor_id, "initiator busy elsewhere");
            return Err(PipelineError::ParticipantBusy(initiator));
        }

        let ctx = ExecutionContext::new(
            ExecutionHandle::new(),
            definition,
            anchor,
            Arc::clone(&self.tuning),
            initiator,
        );
        let execution = Execution::start(ctx, self.services.clock.as_ref(), &mut self.events);
        let handle = execution.handle();
        self.executions.push(execution);
        Ok(handle)
    }

    /// Requests cancellation. The execution observes the request on its
    /// next resume and unwinds through `Restoring`; a request made while
    /// it is already restoring is ignored.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::ExecutionNotFound` if no active execution has
    /// this handle.
    pub fn cancel(&mut self, handle: ExecutionHandle) -> Result<(), PipelineError> {
        let execution = self
            .executions
            .iter_mut()
            .find(|execution| execution.handle() == handle)
            .ok_or(PipelineError::ExecutionNotFound(handle))?;
        execution.request_cancel(self.services.clock.as_ref(), &mut self.events);
        Ok(())
    }

    /// Cancels whatever is running at `anchor_id`. Returns the handle that
    /// was cancelled, or `None` when the anchor was idle.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::AnchorNotFound` for unknown anchors.
    pub fn force_stop(&mut self, anchor_id: &AnchorId) -> Result<Option<ExecutionHandle>, PipelineError> {
        if self.catalog.anchor(anchor_id).is_none() {
            return Err(PipelineError::AnchorNotFound(anchor_id.clone()));
        }
        let Some(handle) = self.active_execution(anchor_id) else {
            return Ok(None);
        };
        info!(anchor = %anchor_id, %handle, "force stop");
        self.cancel(handle)?;
        Ok(Some(handle))
    }

    /// Advances every active execution by `delta` seconds and reports the
    /// ones that finished.
    pub fn tick(&mut self, host: &mut dyn SceneHost, delta: f32) {
        let tick = Tick::new(self.tick_index, delta);
        self.tick_index += 1;

        let mut index = 0;
        while index < self.executions.len() {
            let busy: Vec<ActorId> = self
                .executions
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .flat_map(|(_, execution)| execution.participants())
                .collect();
            let mut env = Env {
                clock: self.services.clock.as_ref(),
                rng: self.services.rng.as_mut(),
                busy: &busy,
                events: &mut self.events,
            };
            match self.executions[index].resume(host, &mut env, tick) {
                Step::Pending => index += 1,
                Step::Ready(_) => {
                    let finished = self.executions.remove(index);
                    self.services.listener.on_complete(&finished.report());
                }
            }
        }
    }

    /// Returns `true` if `actor` is the initiator or partner of an active
    /// execution.
    #[must_use]
    pub fn is_busy(&self, actor: ActorId) -> bool {
        self.executions.iter().any(|execution| execution.involves(actor))
    }

    /// Phase of an active execution.
    #[must_use]
    pub fn phase(&self, handle: ExecutionHandle) -> Option<Phase> {
        self.find(handle).map(Execution::phase)
    }

    #[must_use]
    pub fn snapshot(&self, handle: ExecutionHandle) -> Option<ExecutionSnapshot> {
        self.find(handle).map(Execution::snapshot)
    }

    /// Handle of the execution occupying `anchor_id`, if any.
    #[must_use]
    pub fn active_execution(&self, anchor_id: &AnchorId) -> Option<ExecutionHandle> {
        self.executions
            .iter()
            .find(|execution| execution.anchor_id() == anchor_id)
            .map(Execution::handle)
    }

    /// Number of executions not yet reported.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.executions.len()
    }

    /// Triggers offered at an anchor.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::AnchorNotFound` for unknown anchors.
    pub fn available_triggers(
        &self,
        anchor_id: &AnchorId,
    ) -> Result<Vec<Arc<TriggerDefinition>>, PipelineError> {
        query_handlers::available_triggers(&self.catalog, anchor_id)
    }

    /// Takes every event emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<ExecutionEvent> {
        std::mem::take(&mut self.events)
    }

    fn find(&self, handle: ExecutionHandle) -> Option<&Execution> {
        self.executions
            .iter()
            .find(|execution| execution.handle() == handle)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use encounter_content::domain::anchors::AnchorDefinition;
    use encounter_content::domain::definitions::{
        AnimationMode, AnimationSpec, CinematicSpec, PartnerPolicy, PlaybackSpec,
        SubstituteBehavior,
    };
    use encounter_core::event::DomainEvent;
    use encounter_core::host::{ActorRig, CameraRig};
    use encounter_core::ids::{ClipId, SequenceAssetId};
    use encounter_core::pose::Pose;
    use encounter_core::shot::CameraShotDescriptor;
    use encounter_test_support::{FakeScene, MockRng, SceneCall, fixed_clock};
    use glam::Vec3;

    use super::*;
    use crate::completion::{ExecutionOutcome, ExecutionReport};
    use crate::events::ExecutionEventKind;

    const DT: f32 = 0.25;

    #[derive(Clone, Default)]
    struct RecordingListener(Arc<Mutex<Vec<ExecutionReport>>>);

    impl CompletionListener for RecordingListener {
        fn on_complete(&mut self, report: &ExecutionReport) {
            self.0.lock().unwrap().push(report.clone());
        }
    }

    fn animation(clip: &str) -> PlaybackSpec {
        PlaybackSpec::Animation(AnimationSpec {
            clip: ClipId::from(clip),
            target_state: "Interaction".to_owned(),
            transition_time: 0.25,
            force_interrupt: false,
            placeholder_slot: "InteractionPlaceholder".to_owned(),
            partner: None,
        })
    }

    fn trigger(id: &str, mode: AnimationMode, playback: PlaybackSpec, allow_substitute: bool) -> TriggerDefinition {
        TriggerDefinition {
            id: TriggerId::from(id),
            display_name: id.to_owned(),
            mode,
            playback,
            partner: PartnerPolicy {
                allow_substitute,
                ..PartnerPolicy::default()
            },
        }
    }

    fn encore(film: PlaybackSpec) -> TriggerDefinition {
        let mut encore = trigger("encore", AnimationMode::Synchronized, film, true);
        encore.partner.substitute_behavior = SubstituteBehavior::Active;
        encore
    }

    fn catalog() -> TriggerCatalog {
        let film = PlaybackSpec::Cinematic(CinematicSpec {
            sequence: Some(SequenceAssetId::from("film_seq")),
            shots: vec![CameraShotDescriptor::named("wide")],
            fallback_duration: 1.0,
            activate_camera: true,
            blend_ik: true,
        });
        let triggers = vec![
            trigger("wave", AnimationMode::SingleActor, animation("wave"), false),
            trigger("duet", AnimationMode::PartnerPaired, animation("duet"), false),
            trigger("duet_sub", AnimationMode::PartnerPaired, animation("duet"), true),
            trigger("film", AnimationMode::Synchronized, film.clone(), true),
            encore(film),
        ];
        let mut stage = AnchorDefinition::new("stage", Pose::IDENTITY);
        stage.triggers = triggers.iter().map(|t| t.id.clone()).collect();
        stage.camera_anchors = vec![Pose::at(Vec3::new(0.0, 2.0, -4.0))];
        stage.spawn_points = vec![Vec3::new(2.0, 0.0, 0.0), Vec3::new(-2.5, 0.0, 0.0)];
        let mut porch = AnchorDefinition::new("porch", Pose::at(Vec3::new(1.0, 0.0, 0.0)));
        porch.triggers = vec![TriggerId::from("wave")];
        TriggerCatalog::from_parts(PipelineTuning::default(), vec![stage, porch], triggers).unwrap()
    }

    struct Harness {
        orchestrator: TriggerOrchestrator,
        scene: FakeScene,
        reports: Arc<Mutex<Vec<ExecutionReport>>>,
    }

    impl Harness {
        fn new() -> Self {
            let listener = RecordingListener::default();
            let reports = Arc::clone(&listener.0);
            let orchestrator = TriggerOrchestrator::new(
                Arc::new(catalog()),
                PipelineServices {
                    clock: Box::new(fixed_clock()),
                    rng: Box::new(MockRng),
                    listener: Box::new(listener),
                },
            );
            let mut scene = FakeScene::new();
            scene.add_clip("wave", 1.0);
            scene.add_clip("duet", 1.0);
            scene.add_sequence_asset("film_seq", &["Player", "Partner", "Camera_0", "Fireworks"], Some(2.0));
            Self {
                orchestrator,
                scene,
                reports,
            }
        }

        fn execute(&mut self, trigger: &str, anchor: &str, initiator: ActorId) -> Result<ExecutionHandle, PipelineError> {
            self.orchestrator
                .execute(&TriggerId::from(trigger), &AnchorId::from(anchor), initiator)
        }

        fn step(&mut self) {
            self.orchestrator.tick(&mut self.scene, DT);
            self.scene.advance(DT);
        }

        fn run_until_idle(&mut self) {
            for _ in 0..400 {
                if self.orchestrator.active_count() == 0 {
                    return;
                }
                self.step();
            }
            panic!("executions did not finish");
        }

        fn run_until_phase(&mut self, handle: ExecutionHandle, phase: Phase) {
            for _ in 0..400 {
                if self.orchestrator.phase(handle) == Some(phase) {
                    return;
                }
                self.step();
            }
            panic!("execution never reached {phase:?}");
        }

        fn step_until(&mut self, reached: impl Fn(&Self) -> bool) {
            for _ in 0..400 {
                if reached(self) {
                    return;
                }
                self.step();
            }
            panic!("execution never reached the expected point");
        }

        fn priority_changes(&self) -> usize {
            self.scene
                .count_calls(|c| matches!(c, SceneCall::PrioritySet { .. }))
        }

        fn gestures(&self) -> usize {
            self.scene
                .count_calls(|c| matches!(c, SceneCall::Gesture { .. }))
        }

        fn ik_weight(&self, actor: ActorId) -> f32 {
            self.scene.ik_weight(actor).unwrap_or(f32::NAN)
        }

        fn reports(&self) -> Vec<ExecutionReport> {
            self.reports.lock().unwrap().clone()
        }

        fn toggles(&self, enabled: bool) -> usize {
            self.scene
                .count_calls(|c| matches!(c, SceneCall::CapabilityToggled { enabled: e, .. } if *e == enabled))
        }
    }

    #[test]
    fn test_single_actor_trigger_completes_and_releases_lock_once() {
        // Arrange
        let mut h = Harness::new();
        let initiator = h.scene.add_participant(Vec3::new(0.5, 0.0, 0.5));
        let handle = h.execute("wave", "stage", initiator).unwrap();

        // Act
        h.run_until_idle();

        // Assert
        let reports = h.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].handle, handle);
        assert_eq!(reports[0].outcome, ExecutionOutcome::Completed);
        assert_eq!(reports[0].partner, None);
        assert_eq!(h.toggles(false), 3);
        assert_eq!(h.toggles(true), 3);
        assert!(h.scene.capabilities(initiator).iter().all(|c| c.enabled));
        assert_eq!(h.scene.pose(initiator), Some(Pose::IDENTITY));
        assert!(!h.orchestrator.is_busy(initiator));
        assert_eq!(h.orchestrator.phase(handle), None);
    }

    #[test]
    fn test_reentrant_execute_is_rejected_without_side_effects() {
        // Arrange
        let mut h = Harness::new();
        let first = h.scene.add_participant(Vec3::ZERO);
        let second = h.scene.add_participant(Vec3::new(5.0, 0.0, 0.0));
        h.execute("wave", "stage", first).unwrap();
        let events_before = h.orchestrator.drain_events().len();

        // Act
        let result = h.execute("wave", "stage", second);

        // Assert
        assert!(matches!(result, Err(PipelineError::AlreadyExecuting(anchor)) if anchor.as_str() == "stage"));
        assert_eq!(events_before, 1);
        assert!(h.orchestrator.drain_events().is_empty());
        assert!(h.scene.calls.is_empty());
        assert_eq!(h.orchestrator.active_count(), 1);
        assert!(!h.orchestrator.is_busy(second));
    }

    #[test]
    fn test_execute_rejects_unknown_and_unoffered_requests() {
        let mut h = Harness::new();
        let initiator = h.scene.add_participant(Vec3::ZERO);

        assert!(matches!(
            h.execute("wave", "nowhere", initiator),
            Err(PipelineError::AnchorNotFound(_))
        ));
        assert!(matches!(
            h.execute("juggle", "stage", initiator),
            Err(PipelineError::TriggerNotFound(_))
        ));
        assert!(matches!(
            h.execute("duet", "porch", initiator),
            Err(PipelineError::TriggerNotOffered { .. })
        ));
        assert_eq!(h.orchestrator.active_count(), 0);
    }

    #[test]
    fn test_lone_initiator_without_substitution_reports_no_partner() {
        // Arrange
        let mut h = Harness::new();
        let initiator = h.scene.add_participant(Vec3::ZERO);
        h.execute("duet", "stage", initiator).unwrap();

        // Act
        h.run_until_idle();

        // Assert
        let reports = h.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcome, ExecutionOutcome::NoPartnerAvailable);
        assert!(reports[0].outcome.is_completed());
        assert_eq!(h.toggles(false), 0);
        assert_eq!(h.scene.count_calls(|c| matches!(c, SceneCall::ClipOverridden { .. })), 0);
        assert_eq!(h.scene.count_calls(|c| matches!(c, SceneCall::CrossFade { .. })), 0);
        assert!(h.scene.spawned().is_empty());
    }

    #[test]
    fn test_live_partner_in_range_is_used_without_spawning() {
        // Arrange
        let mut h = Harness::new();
        let initiator = h.scene.add_participant(Vec3::ZERO);
        let other = h.scene.add_participant(Vec3::new(1.0, 0.0, 0.0));
        h.execute("duet_sub", "stage", initiator).unwrap();

        // Act
        h.run_until_idle();

        // Assert
        let reports = h.reports();
        assert_eq!(reports[0].partner, Some(other));
        assert!(!reports[0].substituted);
        assert_eq!(reports[0].outcome, ExecutionOutcome::Completed);
        assert!(h.scene.spawned().is_empty());
        assert_eq!(h.toggles(false), 6);
        assert_eq!(h.toggles(true), 6);
        let partner_slot = h.orchestrator.catalog().anchor(&AnchorId::from("stage")).unwrap().partner_pose();
        assert_eq!(h.scene.pose(other), Some(partner_slot));
    }

    #[test]
    fn test_substitute_is_spawned_prepared_and_despawned() {
        // Arrange
        let mut h = Harness::new();
        let initiator = h.scene.add_participant(Vec3::ZERO);
        let handle = h.execute("duet_sub", "stage", initiator).unwrap();

        // Act
        h.run_until_phase(handle, Phase::Playing);
        let substitute = h.orchestrator.snapshot(handle).unwrap().partner.unwrap();
        let playing_pose = h.scene.pose(substitute);
        h.run_until_idle();

        // Assert
        assert_eq!(h.scene.spawned(), &[substitute]);
        let anchor = h.orchestrator.catalog().anchor(&AnchorId::from("stage")).unwrap();
        assert_eq!(playing_pose, Some(anchor.partner_pose()));
        assert!(!h.scene.is_alive(substitute));
        let reports = h.reports();
        assert!(reports[0].substituted);
        assert_eq!(reports[0].outcome, ExecutionOutcome::Completed);
        assert_eq!(h.toggles(false), h.toggles(true));
    }

    #[test]
    fn test_cancel_mid_playing_unwinds_and_reports_cancelled() {
        // Arrange
        let mut h = Harness::new();
        h.scene.add_sequence_asset("film_seq", &["Player", "Partner", "Camera_0"], Some(30.0));
        let initiator = h.scene.add_participant(Vec3::ZERO);
        let handle = h.execute("film", "stage", initiator).unwrap();
        h.run_until_phase(handle, Phase::Playing);
        for _ in 0..12 {
            h.step();
        }
        let substitute = h.orchestrator.snapshot(handle).unwrap().partner.unwrap();
        assert!(h.scene.sequence_count() > 0);

        // Act
        h.orchestrator.cancel(handle).unwrap();
        h.step();
        let phase_after_cancel = h.orchestrator.phase(handle);
        h.orchestrator.cancel(handle).unwrap();
        h.run_until_idle();

        // Assert
        assert_eq!(phase_after_cancel, Some(Phase::Restoring));
        let reports = h.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcome, ExecutionOutcome::Cancelled);
        assert!(!reports[0].outcome.is_completed());
        assert!(!h.scene.is_alive(substitute));
        assert_eq!(h.toggles(false), 5);
        assert_eq!(h.toggles(true), 5);
        assert_eq!(h.scene.sequence_count(), 0);
        assert_eq!(h.scene.camera_count(), 0);
        assert!((h.scene.ik_weight(initiator).unwrap() - 1.0).abs() < f32::EPSILON);

        let events = h.orchestrator.drain_events();
        let cancels = events
            .iter()
            .filter(|e| matches!(e.kind, ExecutionEventKind::CancelRequested(_)))
            .count();
        assert_eq!(cancels, 1);
        let phases: Vec<Phase> = events
            .iter()
            .filter_map(|e| match &e.kind {
                ExecutionEventKind::PhaseEntered(entered) => Some(entered.phase),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec![
                Phase::ResolvingPartner,
                Phase::Positioning,
                Phase::Playing,
                Phase::Cancelling,
                Phase::Restoring,
                Phase::Cancelled,
            ]
        );
    }

    #[test]
    fn test_cinematic_round_trips_camera_priority_and_ik() {
        // Arrange
        let mut h = Harness::new();
        let initiator = h.scene.add_participant(Vec3::ZERO);
        let partner = h.scene.add_participant(Vec3::new(0.0, 0.0, 1.5));
        h.execute("film", "stage", initiator).unwrap();

        // Act
        h.run_until_idle();

        // Assert
        let priorities: Vec<i32> = h
            .scene
            .calls
            .iter()
            .filter_map(|c| match c {
                SceneCall::PrioritySet { priority, .. } => Some(*priority),
                _ => None,
            })
            .collect();
        assert_eq!(priorities, vec![h.scene.default_priority() + 10, 0]);
        for actor in [initiator, partner] {
            assert!((h.scene.ik_weight(actor).unwrap() - 1.0).abs() < f32::EPSILON);
        }
        assert_eq!(h.scene.camera_count(), 0);
        assert_eq!(h.reports()[0].outcome, ExecutionOutcome::Completed);
    }

    #[test]
    fn test_cancel_during_cinematic_ik_restore_returns_full_weight() {
        // Arrange
        let mut h = Harness::new();
        let initiator = h.scene.add_participant(Vec3::ZERO);
        let partner = h.scene.add_participant(Vec3::new(0.0, 0.0, 1.5));
        let handle = h.execute("film", "stage", initiator).unwrap();
        h.step_until(|h| {
            let weight = h.ik_weight(initiator);
            h.priority_changes() == 2 && weight > 0.0 && weight < 1.0
        });

        // Act
        h.orchestrator.cancel(handle).unwrap();
        h.run_until_idle();

        // Assert
        assert_eq!(h.reports()[0].outcome, ExecutionOutcome::Cancelled);
        for actor in [initiator, partner] {
            assert!((h.ik_weight(actor) - 1.0).abs() < f32::EPSILON);
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum CancelPoint {
        SubstituteWalking,
        Positioning,
        CameraIn,
        IkDown,
        CameraOut,
        IkUp,
    }

    impl CancelPoint {
        fn reached(self, h: &Harness, handle: ExecutionHandle, initiator: ActorId) -> bool {
            let phase = h.orchestrator.phase(handle);
            let weight = h.ik_weight(initiator);
            let blending = weight > 0.0 && weight < 1.0;
            match self {
                Self::SubstituteWalking => {
                    phase == Some(Phase::ResolvingPartner) && !h.scene.spawned().is_empty()
                }
                Self::Positioning => phase == Some(Phase::Positioning),
                Self::CameraIn => {
                    phase == Some(Phase::Playing)
                        && h.priority_changes() == 1
                        && (weight - 1.0).abs() < f32::EPSILON
                }
                Self::IkDown => h.priority_changes() == 1 && blending,
                Self::CameraOut => h.priority_changes() == 2 && weight.abs() < f32::EPSILON,
                Self::IkUp => h.priority_changes() == 2 && blending,
            }
        }
    }

    #[test]
    fn test_cancel_at_every_stage_leaves_scene_restored() {
        let cases = [
            ("duet_sub", false, CancelPoint::SubstituteWalking),
            ("duet", true, CancelPoint::Positioning),
            ("film", true, CancelPoint::CameraIn),
            ("film", true, CancelPoint::IkDown),
            ("film", true, CancelPoint::CameraOut),
            ("film", true, CancelPoint::IkUp),
            ("film", false, CancelPoint::IkUp),
        ];

        for (trigger_id, live_partner, point) in cases {
            // Arrange
            let mut h = Harness::new();
            let initiator = h.scene.add_participant(Vec3::ZERO);
            let partner = live_partner.then(|| h.scene.add_participant(Vec3::new(0.0, 0.0, 1.5)));
            let handle = h.execute(trigger_id, "stage", initiator).unwrap();
            h.step_until(|h| point.reached(h, handle, initiator));

            // Act
            h.orchestrator.cancel(handle).unwrap();
            h.run_until_idle();

            // Assert
            let reports = h.reports();
            assert_eq!(reports.len(), 1, "{point:?}");
            assert_eq!(reports[0].outcome, ExecutionOutcome::Cancelled, "{point:?}");
            assert_eq!(h.toggles(false), h.toggles(true), "{point:?}");
            assert_eq!(h.scene.camera_count(), 0, "{point:?}");
            assert_eq!(h.scene.sequence_count(), 0, "{point:?}");
            for actor in std::iter::once(initiator).chain(partner) {
                assert!((h.ik_weight(actor) - 1.0).abs() < f32::EPSILON, "{point:?}");
            }
            assert!(
                h.scene.spawned().iter().all(|actor| !h.scene.is_alive(*actor)),
                "{point:?}"
            );
            assert!(!h.orchestrator.is_busy(initiator), "{point:?}");
        }
    }

    #[test]
    fn test_substitute_stays_idle_while_restoring() {
        // Arrange
        let mut h = Harness::new();
        h.scene.add_sequence_asset("film_seq", &["Player", "Partner"], Some(30.0));
        let initiator = h.scene.add_participant(Vec3::ZERO);
        let handle = h.execute("encore", "stage", initiator).unwrap();
        h.run_until_phase(handle, Phase::Playing);
        h.step();
        let before = h.gestures();

        // Act
        h.orchestrator.cancel(handle).unwrap();
        h.step();
        let phase = h.orchestrator.phase(handle);
        h.run_until_idle();

        // Assert
        assert_eq!(phase, Some(Phase::Restoring));
        assert_eq!(h.gestures(), before);
        assert_eq!(h.reports()[0].outcome, ExecutionOutcome::Cancelled);
    }

    #[test]
    fn test_unresolved_track_is_reported_as_event() {
        let mut h = Harness::new();
        let initiator = h.scene.add_participant(Vec3::ZERO);
        h.scene.add_participant(Vec3::new(1.0, 0.0, 0.0));
        h.execute("film", "stage", initiator).unwrap();

        h.run_until_idle();

        let unresolved: Vec<String> = h
            .orchestrator
            .drain_events()
            .into_iter()
            .filter_map(|e| match e.kind {
                ExecutionEventKind::BindingUnresolved(b) => Some(b.track),
                _ => None,
            })
            .collect();
        assert_eq!(unresolved, vec!["Fireworks".to_owned()]);
    }

    #[test]
    fn test_force_stop_routes_through_cancellation() {
        // Arrange
        let mut h = Harness::new();
        let initiator = h.scene.add_participant(Vec3::ZERO);
        let handle = h.execute("wave", "stage", initiator).unwrap();
        h.step();

        // Act
        let stopped = h.orchestrator.force_stop(&AnchorId::from("stage")).unwrap();
        h.run_until_idle();

        // Assert
        assert_eq!(stopped, Some(handle));
        assert_eq!(h.reports()[0].outcome, ExecutionOutcome::Cancelled);
        assert_eq!(h.toggles(false), h.toggles(true));
        assert_eq!(h.orchestrator.force_stop(&AnchorId::from("stage")).unwrap(), None);
        assert!(matches!(
            h.orchestrator.force_stop(&AnchorId::from("nowhere")),
            Err(PipelineError::AnchorNotFound(_))
        ));
    }

    #[test]
    fn test_busy_initiator_is_rejected_at_another_anchor() {
        let mut h = Harness::new();
        let initiator = h.scene.add_participant(Vec3::ZERO);
        h.execute("wave", "stage", initiator).unwrap();

        let result = h.execute("wave", "porch", initiator);

        assert!(matches!(result, Err(PipelineError::ParticipantBusy(actor)) if actor == initiator));
        assert!(h.orchestrator.is_busy(initiator));
    }

    #[test]
    fn test_busy_participant_is_not_offered_as_partner() {
        // Arrange
        let mut h = Harness::new();
        let waver = h.scene.add_participant(Vec3::new(1.0, 0.0, 0.0));
        let initiator = h.scene.add_participant(Vec3::ZERO);
        h.execute("wave", "porch", waver).unwrap();
        h.execute("duet", "stage", initiator).unwrap();

        // Act
        h.run_until_idle();

        // Assert
        let outcomes: Vec<(ActorId, ExecutionOutcome)> =
            h.reports().iter().map(|r| (r.initiator, r.outcome)).collect();
        assert!(outcomes.contains(&(initiator, ExecutionOutcome::NoPartnerAvailable)));
        assert!(outcomes.contains(&(waver, ExecutionOutcome::Completed)));
    }

    #[test]
    fn test_events_are_sequenced_per_execution() {
        // Arrange
        let mut h = Harness::new();
        let initiator = h.scene.add_participant(Vec3::ZERO);
        h.execute("wave", "stage", initiator).unwrap();

        // Act
        h.run_until_idle();
        let events = h.orchestrator.drain_events();

        // Assert
        let types: Vec<&str> = events.iter().map(DomainEvent::event_type).collect();
        assert_eq!(
            types,
            vec![
                "execution.requested",
                "execution.phase_entered",
                "execution.partner_resolved",
                "execution.phase_entered",
                "execution.phase_entered",
                "execution.phase_entered",
                "execution.phase_entered",
                "execution.finished",
            ]
        );
        let numbers: Vec<i64> = events.iter().map(|e| e.metadata.sequence_number).collect();
        assert_eq!(numbers, (1..=8).collect::<Vec<i64>>());
        assert!(h.orchestrator.drain_events().is_empty());
    }
}
