//! Per-execution state.

use std::sync::Arc;

use encounter_content::domain::anchors::AnchorDefinition;
use encounter_content::domain::definitions::TriggerDefinition;
use encounter_content::domain::tuning::PipelineTuning;
use encounter_core::ids::{ActorId, CameraId, ExecutionHandle, SequenceInstanceId};
use encounter_partner::brain::InteractionFlags;
use encounter_partner::resolver::PartnerResult;
use encounter_staging::camera::CameraBlendCoordinator;
use encounter_staging::control_lock::DisabledComponentSet;
use encounter_staging::ik::IkWeightLedger;
use serde::{Deserialize, Serialize};

use crate::binding::BindingTable;

/// Where an execution is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    ResolvingPartner,
    Positioning,
    Playing,
    Restoring,
    Completed,
    Cancelling,
    Cancelled,
}

impl Phase {
    /// Returns `true` for `Completed` and `Cancelled`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns `true` once the unwind has started.
    #[must_use]
    pub fn is_unwinding(self) -> bool {
        matches!(self, Self::Restoring) || self.is_terminal()
    }

    /// Lowercase name, as used in events.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ResolvingPartner => "resolving_partner",
            Self::Positioning => "positioning",
            Self::Playing => "playing",
            Self::Restoring => "restoring",
            Self::Completed => "completed",
            Self::Cancelling => "cancelling",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Something playback wants reported, drained by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackNotice {
    /// A sequence track matched no role and no override.
    BindingUnresolved { track: String },
    /// Playback hit its safety timeout after `after` seconds.
    TimedOut { after: f32 },
}

/// A shot camera spawned for this execution, by camera-anchor index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotCamera {
    pub index: usize,
    pub camera: CameraId,
}

/// Everything one execution owns. Created when the request is approved and
/// dropped once the execution reaches a terminal phase.
#[derive(Debug)]
pub struct ExecutionContext {
    pub handle: ExecutionHandle,
    pub definition: Arc<TriggerDefinition>,
    pub anchor: Arc<AnchorDefinition>,
    pub tuning: Arc<PipelineTuning>,
    pub initiator: ActorId,
    pub partner: PartnerResult,
    pub bindings: BindingTable,
    /// Taken exactly once, by the unwind.
    pub disabled: Option<DisabledComponentSet>,
    pub camera: CameraBlendCoordinator,
    pub ik: IkWeightLedger,
    /// Actors whose animator slots were overridden.
    pub overridden: Vec<ActorId>,
    pub shot_cameras: Vec<ShotCamera>,
    pub sequence: Option<SequenceInstanceId>,
    pub flags: InteractionFlags,
    pub phase: Phase,
    pub cancel_requested: bool,
    pub notices: Vec<PlaybackNotice>,
}

impl ExecutionContext {
    /// Creates the context of a freshly approved request.
    #[must_use]
    pub fn new(
        handle: ExecutionHandle,
        definition: Arc<TriggerDefinition>,
        anchor: Arc<AnchorDefinition>,
        tuning: Arc<PipelineTuning>,
        initiator: ActorId,
    ) -> Self {
        let camera = CameraBlendCoordinator::new(tuning.camera_priority_boost);
        Self {
            handle,
            definition,
            anchor,
            tuning,
            initiator,
            partner: PartnerResult::None,
            bindings: BindingTable::default(),
            disabled: None,
            camera,
            ik: IkWeightLedger::new(),
            overridden: Vec::new(),
            shot_cameras: Vec::new(),
            sequence: None,
            flags: InteractionFlags::default(),
            phase: Phase::Idle,
            cancel_requested: false,
            notices: Vec::new(),
        }
    }

    /// Initiator followed by the partner, if there is one.
    #[must_use]
    pub fn participants(&self) -> Vec<ActorId> {
        std::iter::once(self.initiator)
            .chain(self.partner.actor())
            .collect()
    }

    /// Returns `true` if `actor` is the initiator or the partner.
    #[must_use]
    pub fn involves(&self, actor: ActorId) -> bool {
        self.initiator == actor || self.partner.actor() == Some(actor)
    }

    /// The shot camera spawned for a camera-anchor index.
    #[must_use]
    pub fn shot_camera(&self, index: usize) -> Option<CameraId> {
        self.shot_cameras
            .iter()
            .find(|shot| shot.index == index)
            .map(|shot| shot.camera)
    }
}

#[cfg(test)]
mod tests {
    use encounter_content::domain::definitions::{
        AnimationMode, CinematicSpec, PartnerPolicy, PlaybackSpec,
    };
    use encounter_core::ids::TriggerId;
    use encounter_core::pose::Pose;

    use super::*;

    fn context() -> ExecutionContext {
        let definition = TriggerDefinition {
            id: TriggerId::from("bow"),
            display_name: "Bow".to_owned(),
            mode: AnimationMode::PartnerPaired,
            playback: PlaybackSpec::Cinematic(CinematicSpec {
                sequence: None,
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
            ActorId::new(),
        )
    }

    #[test]
    fn test_participants_include_partner_when_resolved() {
        let mut ctx = context();
        assert_eq!(ctx.participants(), vec![ctx.initiator]);

        let partner = ActorId::new();
        ctx.partner = PartnerResult::Live(partner);

        assert_eq!(ctx.participants(), vec![ctx.initiator, partner]);
        assert!(ctx.involves(partner));
    }

    #[test]
    fn test_phase_classification() {
        assert!(Phase::Completed.is_terminal());
        assert!(Phase::Restoring.is_unwinding());
        assert!(!Phase::Cancelling.is_unwinding());
        assert_eq!(Phase::ResolvingPartner.as_str(), "resolving_partner");
    }
}
