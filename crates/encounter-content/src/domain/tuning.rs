//! Pipeline timing and threshold configuration.

use serde::{Deserialize, Serialize};

/// Durations are in simulation seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineTuning {
    /// Time to slide participants onto their anchor slots.
    pub positioning_duration: f32,
    /// Fixed wait after raising or lowering a shot camera's priority.
    pub camera_blend_duration: f32,
    /// How far above the gameplay camera an active shot is raised.
    pub camera_priority_boost: i32,
    /// Duration of IK hand-off blends (down before playback, back after).
    pub ik_blend_duration: f32,
    /// IK weight held while authored animation drives the skeleton.
    pub ik_playback_weight: f32,
    /// Normalized time after which a direct animation counts as done.
    pub completion_threshold: f32,
    /// Added to the clip length to form the direct-animation safety timeout.
    pub timeout_margin: f32,
    /// Lower clamp of the direct-animation safety timeout.
    pub min_animation_timeout: f32,
    /// Upper clamp of the direct-animation safety timeout.
    pub max_animation_timeout: f32,
    /// Bound for a cinematic whose sequence reports no duration.
    pub max_cinematic_duration: f32,
    /// Substitute's pause before it starts walking to its slot.
    pub reaction_delay: f32,
    /// Distance at which the substitute counts as arrived.
    pub stopping_distance: f32,
    /// Time for the substitute to turn to the slot orientation.
    pub rotate_duration: f32,
    /// After this long walking the substitute is placed on its slot.
    pub arrival_timeout: f32,
    /// Substitute idle loop period.
    pub idle_interval: f32,
    /// Chance per idle period that an active substitute gestures.
    pub gesture_probability: f64,
    /// Gestures an active substitute picks from.
    pub idle_gestures: Vec<String>,
}

impl Default for PipelineTuning {
    fn default() -> Self {
        Self {
            positioning_duration: 0.5,
            camera_blend_duration: 1.0,
            camera_priority_boost: 10,
            ik_blend_duration: 0.5,
            ik_playback_weight: 0.0,
            completion_threshold: 0.95,
            timeout_margin: 2.0,
            min_animation_timeout: 1.0,
            max_animation_timeout: 30.0,
            max_cinematic_duration: 120.0,
            reaction_delay: 0.5,
            stopping_distance: 0.3,
            rotate_duration: 0.5,
            arrival_timeout: 10.0,
            idle_interval: 1.0,
            gesture_probability: 0.05,
            idle_gestures: vec!["stretch".to_owned(), "look_around".to_owned()],
        }
    }
}

impl PipelineTuning {
    /// Safety timeout for a direct animation whose clip lasts `clip_length`
    /// seconds (unknown clips use the lower clamp plus the margin).
    #[must_use]
    pub fn animation_timeout(&self, clip_length: Option<f32>) -> f32 {
        let raw = clip_length.unwrap_or(self.min_animation_timeout) + self.timeout_margin;
        raw.clamp(
            self.min_animation_timeout,
            self.max_animation_timeout.max(self.min_animation_timeout),
        )
    }

    /// Upper bound for a cinematic sequence.
    #[must_use]
    pub fn cinematic_timeout(&self, sequence_duration: Option<f32>) -> f32 {
        sequence_duration.map_or(self.max_cinematic_duration, |d| d + self.timeout_margin)
    }
}
