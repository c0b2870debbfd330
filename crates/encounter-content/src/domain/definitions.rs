//! Trigger definitions.

use encounter_core::ids::{ClipId, SequenceAssetId, TriggerId};
use encounter_core::shot::CameraShotDescriptor;
use serde::{Deserialize, Serialize};

/// How many actors a trigger animates and how they relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationMode {
    /// Only the initiator animates; no partner is needed.
    SingleActor,
    /// Initiator and partner play complementary clips.
    PartnerPaired,
    /// Initiator and partner play in lockstep.
    Synchronized,
}

/// Idle behavior of a spawned substitute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstituteBehavior {
    /// No autonomous motion.
    #[default]
    Passive,
    /// Keeps turning to face the initiator.
    Responsive,
    /// Occasionally plays an idle gesture.
    Active,
}

/// The partner's side of a paired animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerClip {
    /// Clip placed in the partner's placeholder slot.
    pub clip: ClipId,
    /// State the partner's animator cross-fades into.
    pub target_state: String,
}

/// A single (or paired) clip played through the animator override slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSpec {
    /// Clip placed in the initiator's placeholder slot.
    pub clip: ClipId,
    /// State that references the placeholder slot.
    pub target_state: String,
    /// Cross-fade duration in seconds.
    #[serde(default = "default_transition_time")]
    pub transition_time: f32,
    /// Start the cross-fade even while another transition is running.
    #[serde(default)]
    pub force_interrupt: bool,
    /// Name of the placeholder slot replaced by the clip.
    #[serde(default = "default_placeholder_slot")]
    pub placeholder_slot: String,
    /// Partner clip for paired modes. When absent in a paired mode the
    /// partner plays the initiator's clip and state.
    #[serde(default)]
    pub partner: Option<PartnerClip>,
}

fn default_transition_time() -> f32 {
    0.25
}

fn default_placeholder_slot() -> String {
    "InteractionPlaceholder".to_owned()
}

/// A multi-track cinematic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CinematicSpec {
    /// Sequence asset to play. Without one the cinematic simply holds for
    /// `fallback_duration`.
    #[serde(default)]
    pub sequence: Option<SequenceAssetId>,
    /// Camera shots, indexed like the anchor's camera anchors.
    #[serde(default)]
    pub shots: Vec<CameraShotDescriptor>,
    /// Hold time in seconds used when no sequence is configured.
    #[serde(default = "default_fallback_duration")]
    pub fallback_duration: f32,
    /// Raise the primary shot above the gameplay camera during playback.
    #[serde(default = "default_true")]
    pub activate_camera: bool,
    /// Lower participants' IK influence while the sequence drives them.
    #[serde(default = "default_true")]
    pub blend_ik: bool,
}

fn default_fallback_duration() -> f32 {
    3.0
}

fn default_true() -> bool {
    true
}

/// What gets played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackSpec {
    /// Animator override + cross-fade.
    Animation(AnimationSpec),
    /// Sequence asset with bound tracks and shot cameras.
    Cinematic(CinematicSpec),
}

/// Partner lookup and substitution rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerPolicy {
    /// Spawn a substitute when no live partner is in range.
    #[serde(default)]
    pub allow_substitute: bool,
    /// Spawner template used for substitutes.
    #[serde(default = "default_substitute_template")]
    pub substitute_template: String,
    /// Idle behavior of the substitute.
    #[serde(default)]
    pub substitute_behavior: SubstituteBehavior,
    /// Overrides the anchor's partner search radius.
    #[serde(default)]
    pub search_radius: Option<f32>,
}

fn default_substitute_template() -> String {
    "substitute".to_owned()
}

impl Default for PartnerPolicy {
    fn default() -> Self {
        Self {
            allow_substitute: false,
            substitute_template: default_substitute_template(),
            substitute_behavior: SubstituteBehavior::default(),
            search_radius: None,
        }
    }
}

/// An authored, named interactive sequence executable at an anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerDefinition {
    /// Stable identifier.
    pub id: TriggerId,
    /// Name shown in menus.
    pub display_name: String,
    /// Actor arrangement.
    pub mode: AnimationMode,
    /// What gets played.
    pub playback: PlaybackSpec,
    /// Partner lookup rules.
    #[serde(default)]
    pub partner: PartnerPolicy,
}

impl TriggerDefinition {
    /// Returns `true` when the trigger cannot run without a second actor.
    #[must_use]
    pub fn requires_partner(&self) -> bool {
        self.mode != AnimationMode::SingleActor
    }

    /// Returns `true` for cinematic triggers.
    #[must_use]
    pub fn is_cinematic(&self) -> bool {
        matches!(self.playback, PlaybackSpec::Cinematic(_))
    }
}
