//! Interaction anchors.

use std::collections::BTreeMap;

use encounter_core::ids::{AnchorId, SceneObjectId, TriggerId};
use encounter_core::pose::Pose;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A scene location where triggers may run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorDefinition {
    /// Stable identifier.
    pub id: AnchorId,
    /// Human-readable name.
    pub name: String,
    /// World pose of the anchor.
    pub pose: Pose,
    /// Where the initiator stands, relative to the anchor.
    #[serde(default)]
    pub initiator_slot: Pose,
    /// Where the partner stands, relative to the anchor.
    #[serde(default = "default_partner_slot")]
    pub partner_slot: Pose,
    /// The interactable object bound to `InteractableObject` tracks.
    #[serde(default)]
    pub interactable: Option<SceneObjectId>,
    /// World poses cameras are spawned at; `Camera_<n>` tracks index here.
    #[serde(default)]
    pub camera_anchors: Vec<Pose>,
    /// Candidate world positions for spawning substitutes.
    #[serde(default)]
    pub spawn_points: Vec<Vec3>,
    /// How far from the initiator a live partner may be.
    #[serde(default = "default_search_radius")]
    pub partner_search_radius: f32,
    /// Triggers offered at this anchor, in menu order.
    #[serde(default)]
    pub triggers: Vec<TriggerId>,
    /// Extra track bindings: track name → scene object.
    #[serde(default)]
    pub binding_overrides: BTreeMap<String, SceneObjectId>,
}

fn default_partner_slot() -> Pose {
    Pose::new(Vec3::new(0.0, 0.0, 1.0), glam::Quat::from_rotation_y(std::f32::consts::PI))
}

fn default_search_radius() -> f32 {
    3.0
}

impl AnchorDefinition {
    /// Creates an anchor with default slots and no offered triggers.
    #[must_use]
    pub fn new(id: impl Into<AnchorId>, pose: Pose) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            pose,
            initiator_slot: Pose::IDENTITY,
            partner_slot: default_partner_slot(),
            interactable: None,
            camera_anchors: Vec::new(),
            spawn_points: Vec::new(),
            partner_search_radius: default_search_radius(),
            triggers: Vec::new(),
            binding_overrides: BTreeMap::new(),
        }
    }

    /// World pose the initiator is moved to.
    #[must_use]
    pub fn initiator_pose(&self) -> Pose {
        self.pose.compose(&self.initiator_slot)
    }

    /// World pose the partner is moved to.
    #[must_use]
    pub fn partner_pose(&self) -> Pose {
        self.pose.compose(&self.partner_slot)
    }

    /// Returns `true` if the anchor offers `trigger`.
    #[must_use]
    pub fn offers(&self, trigger: &TriggerId) -> bool {
        self.triggers.contains(trigger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partner_pose_defaults_to_facing_initiator() {
        let anchor = AnchorDefinition::new("bench", Pose::at(Vec3::new(4.0, 0.0, 0.0)));

        let initiator = anchor.initiator_pose();
        let partner = anchor.partner_pose();

        assert!(initiator.position.distance(Vec3::new(4.0, 0.0, 0.0)) < 1e-5);
        assert!(partner.position.distance(Vec3::new(4.0, 0.0, 1.0)) < 1e-5);
        let partner_forward = partner.rotation * Vec3::Z;
        assert!(partner_forward.distance(Vec3::NEG_Z) < 1e-5);
    }

    #[test]
    fn test_offers_only_listed_triggers() {
        let mut anchor = AnchorDefinition::new("bench", Pose::IDENTITY);
        anchor.triggers.push(TriggerId::from("hug"));

        assert!(anchor.offers(&TriggerId::from("hug")));
        assert!(!anchor.offers(&TriggerId::from("dance")));
    }
}
