//! Binding Resolver.
//!
//! Maps a sequence's track names onto runtime objects. Role keywords are
//! matched by substring in a fixed order (`Player`, `Partner`,
//! `InteractableObject`, `Camera`); tracks matching no role fall back to the
//! anchor's override map, exact name first, then substring in either
//! direction. Tracks that resolve to nothing stay unbound.

use std::collections::BTreeMap;

use encounter_content::domain::definitions::PlaybackSpec;
use encounter_core::host::{BindingTarget, CameraRig, SequenceDirector};
use encounter_core::ids::{ActorId, CameraId, SceneObjectId, SequenceInstanceId};
use encounter_core::shot::{CameraShotDescriptor, ShotPlacement};
use tracing::{debug, warn};

use crate::context::{ExecutionContext, PlaybackNotice, ShotCamera};

const PLAYER: &str = "Player";
const PARTNER: &str = "Partner";
const INTERACTABLE: &str = "InteractableObject";
const CAMERA: &str = "Camera";

/// A role recognised in a track name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackRole {
    Player,
    Partner,
    InteractableObject,
    /// A camera track, with its camera-anchor index as written.
    Camera(Option<usize>),
}

impl TrackRole {
    /// Classifies a track by the first role keyword it contains.
    #[must_use]
    pub fn classify(track: &str) -> Option<Self> {
        if track.contains(PLAYER) {
            Some(Self::Player)
        } else if track.contains(PARTNER) {
            Some(Self::Partner)
        } else if track.contains(INTERACTABLE) {
            Some(Self::InteractableObject)
        } else if let Some(at) = track.find(CAMERA) {
            Some(Self::Camera(camera_index(&track[at + CAMERA.len()..])))
        } else {
            None
        }
    }
}

/// Parses the `_<n>` suffix that follows `Camera`.
fn camera_index(rest: &str) -> Option<usize> {
    let digits: String = rest
        .strip_prefix('_')?
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// What a track should be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackTarget {
    /// An object that already exists.
    Bound(BindingTarget),
    /// The shot camera at this camera-anchor index, spawned on demand.
    ShotAnchor(usize),
}

/// The runtime objects roles resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingRoles {
    pub initiator: ActorId,
    pub partner: Option<ActorId>,
    pub interactable: Option<SceneObjectId>,
    pub camera_anchor_count: usize,
}

/// Resolves one track name. Returns `None` when neither a role nor an
/// override applies.
#[must_use]
pub fn resolve_track(
    track: &str,
    roles: &BindingRoles,
    overrides: &BTreeMap<String, SceneObjectId>,
) -> Option<TrackTarget> {
    let by_role = match TrackRole::classify(track) {
        Some(TrackRole::Player) => Some(TrackTarget::Bound(BindingTarget::Actor(roles.initiator))),
        Some(TrackRole::Partner) => roles
            .partner
            .map(|partner| TrackTarget::Bound(BindingTarget::Actor(partner))),
        Some(TrackRole::InteractableObject) => roles
            .interactable
            .map(|object| TrackTarget::Bound(BindingTarget::Object(object))),
        Some(TrackRole::Camera(index)) => (roles.camera_anchor_count > 0).then(|| {
            let index = index.filter(|&i| i < roles.camera_anchor_count).unwrap_or(0);
            TrackTarget::ShotAnchor(index)
        }),
        None => None,
    };
    by_role.or_else(|| {
        override_for(track, overrides).map(|object| TrackTarget::Bound(BindingTarget::Object(object)))
    })
}

fn override_for(track: &str, overrides: &BTreeMap<String, SceneObjectId>) -> Option<SceneObjectId> {
    overrides.get(track).copied().or_else(|| {
        overrides
            .iter()
            .find(|(name, _)| track.contains(name.as_str()) || name.contains(track))
            .map(|(_, object)| *object)
    })
}

/// Every binding made for one sequence instance, cleared as one unit.
#[derive(Debug, Default, PartialEq)]
pub struct BindingTable {
    instance: Option<SequenceInstanceId>,
    tracks: Vec<(String, BindingTarget)>,
}

impl BindingTable {
    /// Number of bound tracks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Returns `true` if no track is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// The object bound to `track`.
    #[must_use]
    pub fn target(&self, track: &str) -> Option<BindingTarget> {
        self.tracks
            .iter()
            .find(|(name, _)| name == track)
            .map(|(_, target)| *target)
    }

    /// Binds `track` and records the binding.
    pub fn bind<H: SequenceDirector + ?Sized>(
        &mut self,
        host: &mut H,
        instance: SequenceInstanceId,
        track: &str,
        target: BindingTarget,
    ) {
        host.bind_track(instance, track, target);
        self.instance = Some(instance);
        self.tracks.push((track.to_owned(), target));
    }

    /// Clears every recorded binding. Returns how many were cleared; a
    /// second call clears nothing.
    pub fn clear<H: SequenceDirector + ?Sized>(&mut self, host: &mut H) -> usize {
        let Some(instance) = self.instance.take() else {
            return 0;
        };
        let cleared = self.tracks.len();
        for (track, _) in self.tracks.drain(..) {
            host.clear_track(instance, &track);
        }
        cleared
    }
}

/// Returns the context's shot camera for a camera-anchor index, spawning it
/// on first use.
pub fn ensure_shot_camera<H: CameraRig + ?Sized>(
    host: &mut H,
    ctx: &mut ExecutionContext,
    index: usize,
    descriptor: CameraShotDescriptor,
) -> Option<CameraId> {
    if let Some(camera) = ctx.shot_camera(index) {
        return Some(camera);
    }
    let anchor = ctx
        .anchor
        .camera_anchors
        .get(index)
        .copied()
        .unwrap_or(ctx.anchor.pose);
    let camera = host.spawn_shot(&ShotPlacement { descriptor, anchor })?;
    ctx.shot_cameras.push(ShotCamera { index, camera });
    Some(camera)
}

/// The shot descriptor used for a camera-anchor index.
#[must_use]
pub fn shot_for(ctx: &ExecutionContext, index: usize) -> CameraShotDescriptor {
    let shots = match &ctx.definition.playback {
        PlaybackSpec::Cinematic(spec) => spec.shots.as_slice(),
        PlaybackSpec::Animation(_) => &[],
    };
    shots
        .get(index)
        .or_else(|| shots.first())
        .cloned()
        .unwrap_or_else(|| CameraShotDescriptor::named(format!("{CAMERA}_{index}")))
}

/// Resolves and binds every track of `instance`, recording the bindings in
/// the context's table. Unresolved tracks are logged and reported as
/// notices. Returns the number of bound tracks.
pub fn bind_sequence<H: SequenceDirector + CameraRig + ?Sized>(
    host: &mut H,
    ctx: &mut ExecutionContext,
    instance: SequenceInstanceId,
) -> usize {
    let roles = BindingRoles {
        initiator: ctx.initiator,
        partner: ctx.partner.actor(),
        interactable: ctx.anchor.interactable,
        camera_anchor_count: ctx.anchor.camera_anchors.len(),
    };
    for track in host.track_names(instance) {
        let target = match resolve_track(&track, &roles, &ctx.anchor.binding_overrides) {
            Some(TrackTarget::Bound(target)) => Some(target),
            Some(TrackTarget::ShotAnchor(index)) => {
                let descriptor = shot_for(ctx, index);
                ensure_shot_camera(host, ctx, index, descriptor).map(BindingTarget::Camera)
            }
            None => None,
        };
        if let Some(target) = target {
            debug!(%track, ?target, "track bound");
            ctx.bindings.bind(host, instance, &track, target);
        } else {
            warn!(handle = %ctx.handle, %track, "track left unbound");
            ctx.notices.push(PlaybackNotice::BindingUnresolved { track });
        }
    }
    ctx.bindings.len()
}
