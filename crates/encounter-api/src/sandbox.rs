//! In-process scene the server drives when no engine is attached.
//!
//! Every clip lasts `clip_length` seconds and every sequence asset loads with
//! the same track list and `sequence_duration`. That is enough for the
//! pipeline to run its full lifecycle against HTTP-registered participants.

use std::collections::{BTreeMap, HashMap};

use encounter_core::host::{
    ActorRig, ActorSpawner, AnimationDriver, AnimatorState, BindingTarget, Capability,
    CapabilityRole, CapabilitySlot, CameraRig, Navigator, ParticipantDirectory, SequenceDirector,
};
use encounter_core::ids::{ActorId, CameraId, ClipId, SequenceAssetId, SequenceInstanceId};
use encounter_core::pose::Pose;
use encounter_core::shot::ShotPlacement;
use glam::Vec3;
use serde::Serialize;
use tracing::debug;

const LOCOMOTION: &str = "Locomotion";
const GAMEPLAY_CAMERA_PRIORITY: i32 = 10;
const SUBSTITUTE_SPEED: f32 = 1.5;

#[derive(Debug, Clone)]
struct Animator {
    state: String,
    normalized_time: f32,
    transition_left: f32,
    overrides: BTreeMap<String, ClipId>,
}

impl Default for Animator {
    fn default() -> Self {
        Self {
            state: LOCOMOTION.to_owned(),
            normalized_time: 0.0,
            transition_left: 0.0,
            overrides: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct SandboxActor {
    pose: Pose,
    capabilities: Vec<Capability>,
    ik_weight: f32,
    animator: Animator,
    destination: Option<Vec3>,
    speed: f32,
    substitute: bool,
    last_gesture: Option<String>,
}

impl SandboxActor {
    fn participant(pose: Pose) -> Self {
        Self {
            pose,
            capabilities: vec![
                capability(CapabilityRole::Movement, CapabilitySlot::Behaviour(0)),
                capability(CapabilityRole::AnimationDrive, CapabilitySlot::Behaviour(1)),
                capability(CapabilityRole::Movement, CapabilitySlot::Collider),
                capability(CapabilityRole::Presentation, CapabilitySlot::Behaviour(2)),
            ],
            ik_weight: 1.0,
            animator: Animator::default(),
            destination: None,
            speed: 0.0,
            substitute: false,
            last_gesture: None,
        }
    }

    fn substitute(pose: Pose) -> Self {
        Self {
            capabilities: vec![
                capability(CapabilityRole::Movement, CapabilitySlot::NavigationAgent),
                capability(CapabilityRole::AnimationDrive, CapabilitySlot::Behaviour(0)),
            ],
            speed: SUBSTITUTE_SPEED,
            substitute: true,
            ..Self::participant(pose)
        }
    }

    fn set_enabled(&mut self, slot: CapabilitySlot, enabled: bool) {
        if let Some(entry) = self.capabilities.iter_mut().find(|c| c.slot == slot) {
            entry.enabled = enabled;
        }
    }

    fn is_enabled(&self, slot: CapabilitySlot) -> bool {
        self.capabilities
            .iter()
            .any(|c| c.slot == slot && c.enabled)
    }
}

fn capability(role: CapabilityRole, slot: CapabilitySlot) -> Capability {
    Capability {
        role,
        slot,
        enabled: true,
    }
}

#[derive(Debug, Clone)]
struct SandboxSequence {
    tracks: Vec<String>,
    bindings: HashMap<String, BindingTarget>,
    elapsed: f32,
    playing: bool,
}

/// Public view of an actor, as served over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActorView {
    pub actor_id: ActorId,
    pub position: Vec3,
    pub substitute: bool,
    pub animator_state: String,
    pub ik_weight: f32,
    /// Components currently disabled by a control lock.
    pub disabled_components: usize,
    pub last_gesture: Option<String>,
}

/// The sandbox scene.
#[derive(Debug, Clone)]
pub struct SandboxScene {
    actors: HashMap<ActorId, SandboxActor>,
    order: Vec<ActorId>,
    cameras: HashMap<CameraId, i32>,
    sequences: HashMap<SequenceInstanceId, SandboxSequence>,
    clip_length: f32,
    sequence_duration: f32,
    sequence_tracks: Vec<String>,
}

impl Default for SandboxScene {
    fn default() -> Self {
        Self::new(2.0, 4.0)
    }
}

impl SandboxScene {
    /// Creates an empty scene with uniform clip and sequence lengths.
    #[must_use]
    pub fn new(clip_length: f32, sequence_duration: f32) -> Self {
        Self {
            actors: HashMap::new(),
            order: Vec::new(),
            cameras: HashMap::new(),
            sequences: HashMap::new(),
            clip_length,
            sequence_duration,
            sequence_tracks: vec![
                "Player".to_owned(),
                "Partner".to_owned(),
                "Camera_0".to_owned(),
            ],
        }
    }

    /// Registers a participant standing at `position`.
    pub fn add_participant(&mut self, position: Vec3) -> ActorId {
        let actor = ActorId::new();
        self.actors
            .insert(actor, SandboxActor::participant(Pose::at(position)));
        self.order.push(actor);
        debug!(%actor, ?position, "participant added");
        actor
    }

    /// Looks up an actor.
    #[must_use]
    pub fn actor(&self, actor: ActorId) -> Option<ActorView> {
        self.actors.get(&actor).map(|a| ActorView {
            actor_id: actor,
            position: a.pose.position,
            substitute: a.substitute,
            animator_state: a.animator.state.clone(),
            ik_weight: a.ik_weight,
            disabled_components: a.capabilities.iter().filter(|c| !c.enabled).count(),
            last_gesture: a.last_gesture.clone(),
        })
    }

    /// Number of live shot cameras.
    #[must_use]
    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    /// Advances animators, navigation and sequences by `delta` seconds.
    pub fn advance(&mut self, delta: f32) {
        let clip_length = self.clip_length.max(f32::EPSILON);
        for actor in self.actors.values_mut() {
            let animator = &mut actor.animator;
            animator.transition_left = (animator.transition_left - delta).max(0.0);
            animator.normalized_time += delta / clip_length;

            if let Some(destination) = actor.destination {
                let to_go = destination - actor.pose.position;
                let step = actor.speed * delta;
                if to_go.length() <= step {
                    actor.pose.position = destination;
                    actor.destination = None;
                } else {
                    actor.pose.position += to_go.normalize() * step;
                }
            }
        }
        for sequence in self.sequences.values_mut() {
            if sequence.playing {
                sequence.elapsed += delta;
            }
        }
    }
}

impl ActorRig for SandboxScene {
    fn is_alive(&self, actor: ActorId) -> bool {
        self.actors.contains_key(&actor)
    }

    fn pose(&self, actor: ActorId) -> Option<Pose> {
        self.actors.get(&actor).map(|a| a.pose)
    }

    fn set_pose(&mut self, actor: ActorId, pose: Pose) {
        if let Some(a) = self.actors.get_mut(&actor) {
            a.pose = pose;
        }
    }

    fn capabilities(&self, actor: ActorId) -> Vec<Capability> {
        self.actors
            .get(&actor)
            .map(|a| a.capabilities.clone())
            .unwrap_or_default()
    }

    fn set_behaviour_enabled(&mut self, actor: ActorId, index: u16, enabled: bool) {
        if let Some(a) = self.actors.get_mut(&actor) {
            a.set_enabled(CapabilitySlot::Behaviour(index), enabled);
        }
    }

    fn set_collider_enabled(&mut self, actor: ActorId, enabled: bool) {
        if let Some(a) = self.actors.get_mut(&actor) {
            a.set_enabled(CapabilitySlot::Collider, enabled);
        }
    }

    fn set_navigation_enabled(&mut self, actor: ActorId, enabled: bool) {
        if let Some(a) = self.actors.get_mut(&actor) {
            a.set_enabled(CapabilitySlot::NavigationAgent, enabled);
            if !enabled {
                a.destination = None;
            }
        }
    }

    fn ik_weight(&self, actor: ActorId) -> Option<f32> {
        self.actors.get(&actor).map(|a| a.ik_weight)
    }

    fn set_ik_weight(&mut self, actor: ActorId, weight: f32) {
        if let Some(a) = self.actors.get_mut(&actor) {
            a.ik_weight = weight.clamp(0.0, 1.0);
        }
    }
}

impl AnimationDriver for SandboxScene {
    fn has_animator(&self, actor: ActorId) -> bool {
        self.actors.contains_key(&actor)
    }

    fn override_clip(&mut self, actor: ActorId, slot: &str, clip: &ClipId) -> bool {
        let Some(a) = self.actors.get_mut(&actor) else {
            return false;
        };
        a.animator.overrides.insert(slot.to_owned(), clip.clone());
        true
    }

    fn clear_overrides(&mut self, actor: ActorId) {
        if let Some(a) = self.actors.get_mut(&actor) {
            a.animator = Animator::default();
        }
    }

    fn cross_fade(&mut self, actor: ActorId, state: &str, transition: f32, interrupt: bool) {
        let Some(a) = self.actors.get_mut(&actor) else {
            return;
        };
        let animator = &mut a.animator;
        if animator.transition_left > 0.0 && !interrupt {
            return;
        }
        state.clone_into(&mut animator.state);
        animator.normalized_time = 0.0;
        animator.transition_left = transition.max(0.0);
    }

    fn animator_state(&self, actor: ActorId) -> Option<AnimatorState> {
        self.actors.get(&actor).map(|a| AnimatorState {
            state: a.animator.state.clone(),
            normalized_time: a.animator.normalized_time,
            in_transition: a.animator.transition_left > 0.0,
        })
    }

    fn clip_length(&self, _clip: &ClipId) -> Option<f32> {
        Some(self.clip_length)
    }
}

impl CameraRig for SandboxScene {
    fn default_priority(&self) -> i32 {
        GAMEPLAY_CAMERA_PRIORITY
    }

    fn spawn_shot(&mut self, placement: &ShotPlacement) -> Option<CameraId> {
        let camera = CameraId::new();
        self.cameras.insert(camera, 0);
        debug!(%camera, shot = %placement.descriptor.name, "shot camera spawned");
        Some(camera)
    }

    fn priority(&self, camera: CameraId) -> Option<i32> {
        self.cameras.get(&camera).copied()
    }

    fn set_priority(&mut self, camera: CameraId, priority: i32) {
        if let Some(current) = self.cameras.get_mut(&camera) {
            *current = priority;
        }
    }

    fn despawn_shot(&mut self, camera: CameraId) {
        self.cameras.remove(&camera);
    }
}

impl SequenceDirector for SandboxScene {
    fn load_sequence(&mut self, asset: &SequenceAssetId) -> Option<SequenceInstanceId> {
        let instance = SequenceInstanceId::new();
        self.sequences.insert(
            instance,
            SandboxSequence {
                tracks: self.sequence_tracks.clone(),
                bindings: HashMap::new(),
                elapsed: 0.0,
                playing: false,
            },
        );
        debug!(%asset, %instance, "sequence loaded");
        Some(instance)
    }

    fn track_names(&self, instance: SequenceInstanceId) -> Vec<String> {
        self.sequences
            .get(&instance)
            .map(|s| s.tracks.clone())
            .unwrap_or_default()
    }

    fn bind_track(&mut self, instance: SequenceInstanceId, track: &str, target: BindingTarget) {
        if let Some(sequence) = self.sequences.get_mut(&instance) {
            sequence.bindings.insert(track.to_owned(), target);
        }
    }

    fn clear_track(&mut self, instance: SequenceInstanceId, track: &str) {
        if let Some(sequence) = self.sequences.get_mut(&instance) {
            sequence.bindings.remove(track);
        }
    }

    fn play(&mut self, instance: SequenceInstanceId) {
        if let Some(sequence) = self.sequences.get_mut(&instance) {
            sequence.elapsed = 0.0;
            sequence.playing = true;
        }
    }

    fn is_finished(&self, instance: SequenceInstanceId) -> bool {
        self.sequences
            .get(&instance)
            .is_none_or(|s| s.playing && s.elapsed >= self.sequence_duration)
    }

    fn duration(&self, _instance: SequenceInstanceId) -> Option<f32> {
        Some(self.sequence_duration)
    }

    fn stop(&mut self, instance: SequenceInstanceId) {
        self.sequences.remove(&instance);
    }
}

impl ParticipantDirectory for SandboxScene {
    fn participants_near(&self, center: Vec3, radius: f32) -> Vec<ActorId> {
        self.order
            .iter()
            .filter(|id| {
                self.actors
                    .get(id)
                    .is_some_and(|a| !a.substitute && a.pose.position.distance(center) <= radius)
            })
            .copied()
            .collect()
    }
}

impl ActorSpawner for SandboxScene {
    fn spawn_substitute(&mut self, template: &str, pose: Pose) -> Option<ActorId> {
        let actor = ActorId::new();
        self.actors.insert(actor, SandboxActor::substitute(pose));
        self.order.push(actor);
        debug!(%actor, template, "substitute spawned");
        Some(actor)
    }

    fn despawn(&mut self, actor: ActorId) {
        self.actors.remove(&actor);
        self.order.retain(|id| *id != actor);
    }
}

impl Navigator for SandboxScene {
    fn set_destination(&mut self, actor: ActorId, destination: Vec3) -> bool {
        match self.actors.get_mut(&actor) {
            Some(a) if a.is_enabled(CapabilitySlot::NavigationAgent) => {
                a.destination = Some(destination);
                true
            }
            _ => false,
        }
    }

    fn remaining_distance(&self, actor: ActorId) -> Option<f32> {
        let a = self.actors.get(&actor)?;
        Some(
            a.destination
                .map_or(0.0, |destination| destination.distance(a.pose.position)),
        )
    }

    fn stop(&mut self, actor: ActorId) {
        if let Some(a) = self.actors.get_mut(&actor) {
            a.destination = None;
        }
    }

    fn play_gesture(&mut self, actor: ActorId, gesture: &str) {
        if let Some(a) = self.actors.get_mut(&actor) {
            a.last_gesture = Some(gesture.to_owned());
        }
    }
}
