//! Camera shot descriptors.
//!
//! Shots are read-only configuration consumed by the camera system; the
//! pipeline only spawns them at an anchor and changes their priority.

use serde::{Deserialize, Serialize};

use crate::pose::Pose;

/// How the camera system blends into a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCurve {
    /// Hard cut.
    Cut,
    /// Linear blend.
    #[default]
    Linear,
    /// Smoothstep blend.
    EaseInOut,
}

/// Camera motion while the shot is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementStyle {
    #[default]
    Static,
    Tracking,
    Orbit,
    Dolly,
}

/// A configured camera position and behavior used during cinematic playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraShotDescriptor {
    /// Shot name, for logs and tooling.
    pub name: String,
    /// Offset relative to the shot anchor the camera is spawned at.
    #[serde(default)]
    pub offset: Pose,
    /// Vertical field of view in degrees.
    #[serde(default = "default_field_of_view")]
    pub field_of_view: f32,
    /// Blend curve used when the shot goes live.
    #[serde(default)]
    pub transition: TransitionCurve,
    /// Camera motion while live.
    #[serde(default)]
    pub movement: MovementStyle,
    /// Role name (`Player`, `Partner`, ...) the camera should track, if any.
    #[serde(default)]
    pub track_target: Option<String>,
}

fn default_field_of_view() -> f32 {
    50.0
}

impl CameraShotDescriptor {
    /// A static, untracked shot with default lens settings.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            offset: Pose::IDENTITY,
            field_of_view: default_field_of_view(),
            transition: TransitionCurve::default(),
            movement: MovementStyle::default(),
            track_target: None,
        }
    }
}

/// Where and how a shot camera should be created.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotPlacement {
    /// The shot being placed.
    pub descriptor: CameraShotDescriptor,
    /// World pose of the shot anchor; the descriptor offset is applied on top.
    pub anchor: Pose,
}

impl ShotPlacement {
    /// World pose of the camera.
    #[must_use]
    pub fn world_pose(&self) -> Pose {
        self.anchor.compose(&self.descriptor.offset)
    }
}
