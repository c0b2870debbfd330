//! Rigid poses and the interpolation used to move participants.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and orientation of an actor or anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// World (or anchor-local) position.
    #[serde(default)]
    pub position: Vec3,
    /// World (or anchor-local) orientation.
    #[serde(default = "identity_rotation")]
    pub rotation: Quat,
}

fn identity_rotation() -> Quat {
    Quat::IDENTITY
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    /// The pose at the origin with no rotation.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Creates a pose.
    #[must_use]
    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Creates an unrotated pose at `position`.
    #[must_use]
    pub const fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Interpolates towards `to`: translation is linear, rotation takes the
    /// shortest arc. `t` is clamped to `[0, 1]` and `t >= 1` returns `to`
    /// exactly.
    #[must_use]
    pub fn interpolate(&self, to: &Pose, t: f32) -> Pose {
        if t >= 1.0 {
            return *to;
        }
        let t = t.max(0.0);
        Pose {
            position: self.position.lerp(to.position, t),
            rotation: self.rotation.slerp(to.rotation, t).normalize(),
        }
    }

    /// Transforms a pose expressed relative to `self` into the space `self`
    /// lives in.
    #[must_use]
    pub fn compose(&self, local: &Pose) -> Pose {
        Pose {
            position: self.position + self.rotation * local.position,
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }

    /// Distance between the two positions.
    #[must_use]
    pub fn distance(&self, other: &Pose) -> f32 {
        self.position.distance(other.position)
    }
}

/// Yaw-only rotation that makes something at `from` look at `to`.
///
/// Returns `None` when the two points coincide on the ground plane.
#[must_use]
pub fn facing(from: Vec3, to: Vec3) -> Option<Quat> {
    let direction = Vec3::new(to.x - from.x, 0.0, to.z - from.z);
    if direction.length_squared() <= f32::EPSILON {
        return None;
    }
    Some(Quat::from_rotation_y(direction.x.atan2(direction.z)))
}
