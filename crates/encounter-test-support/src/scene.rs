//! Fake scene — an in-memory `SceneHost` with a call journal.
//!
//! The fake simulates just enough of an engine for the pipeline to run end
//! to end: animators advance normalized time, sequences run to their
//! duration, navigation agents walk at a fixed speed. Every mutating host
//! call is appended to [`FakeScene::calls`] so tests can assert on what the
//! pipeline did, in which order, and how often.

use std::collections::{BTreeMap, HashMap, HashSet};

use encounter_core::host::{
    ActorRig, ActorSpawner, AnimationDriver, AnimatorState, BindingTarget, CameraRig, Capability,
    CapabilityRole, CapabilitySlot, Navigator, ParticipantDirectory, SequenceDirector,
};
use encounter_core::ids::{ActorId, CameraId, ClipId, SequenceAssetId, SequenceInstanceId};
use encounter_core::pose::Pose;
use encounter_core::shot::ShotPlacement;
use glam::Vec3;

/// Default clip length used when an animator plays a clip the scene does not
/// know.
const UNKNOWN_CLIP_LENGTH: f32 = 1.0;

/// A mutating call the pipeline made against the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCall {
    PoseSet { actor: ActorId },
    CapabilityToggled { actor: ActorId, slot: CapabilitySlot, enabled: bool },
    IkWeightSet { actor: ActorId, weight: f32 },
    ClipOverridden { actor: ActorId, slot: String, clip: ClipId },
    OverridesCleared { actor: ActorId },
    CrossFade { actor: ActorId, state: String, interrupt: bool },
    ShotSpawned { camera: CameraId },
    PrioritySet { camera: CameraId, priority: i32 },
    ShotDespawned { camera: CameraId },
    SequenceLoaded { instance: SequenceInstanceId },
    TrackBound { instance: SequenceInstanceId, track: String, target: BindingTarget },
    TrackCleared { instance: SequenceInstanceId, track: String },
    SequencePlayed { instance: SequenceInstanceId },
    SequenceStopped { instance: SequenceInstanceId },
    Spawned { actor: ActorId },
    Despawned { actor: ActorId },
    DestinationSet { actor: ActorId, destination: Vec3 },
    NavigationStopped { actor: ActorId },
    Gesture { actor: ActorId, gesture: String },
}

/// Simulated animation player.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeAnimator {
    pub state: String,
    pub normalized_time: f32,
    pub in_transition: bool,
    pub overrides: BTreeMap<String, ClipId>,
    /// Length of whatever the current state plays.
    pub playing_length: f32,
    /// A stuck animator silently ignores cross-fades.
    pub stuck: bool,
}

impl Default for FakeAnimator {
    fn default() -> Self {
        Self {
            state: "Locomotion".to_owned(),
            normalized_time: 0.0,
            in_transition: false,
            overrides: BTreeMap::new(),
            playing_length: UNKNOWN_CLIP_LENGTH,
            stuck: false,
        }
    }
}

/// Simulated actor.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeActor {
    pub pose: Pose,
    pub capabilities: Vec<Capability>,
    pub ik_weight: Option<f32>,
    pub animator: Option<FakeAnimator>,
    /// Listed by the participant directory.
    pub participant: bool,
    pub destination: Option<Vec3>,
    pub speed: f32,
    pub navigation_blocked: bool,
    pub gestures: Vec<String>,
}

impl FakeActor {
    /// A player-controlled participant: movement and animation-drive
    /// behaviours, a collider, a full-weight IK solver and an animator.
    #[must_use]
    pub fn participant(pose: Pose) -> Self {
        Self {
            pose,
            capabilities: vec![
                Capability {
                    role: CapabilityRole::Movement,
                    slot: CapabilitySlot::Behaviour(0),
                    enabled: true,
                },
                Capability {
                    role: CapabilityRole::AnimationDrive,
                    slot: CapabilitySlot::Behaviour(1),
                    enabled: true,
                },
                Capability {
                    role: CapabilityRole::Movement,
                    slot: CapabilitySlot::Collider,
                    enabled: true,
                },
            ],
            ik_weight: Some(1.0),
            animator: Some(FakeAnimator::default()),
            participant: true,
            destination: None,
            speed: 0.0,
            navigation_blocked: false,
            gestures: Vec::new(),
        }
    }

    /// A spawned substitute: navigation agent, animation-drive behaviour, IK
    /// and an animator; not listed as a participant.
    #[must_use]
    pub fn substitute(pose: Pose) -> Self {
        Self {
            pose,
            capabilities: vec![
                Capability {
                    role: CapabilityRole::Movement,
                    slot: CapabilitySlot::NavigationAgent,
                    enabled: true,
                },
                Capability {
                    role: CapabilityRole::AnimationDrive,
                    slot: CapabilitySlot::Behaviour(0),
                    enabled: true,
                },
            ],
            ik_weight: Some(1.0),
            animator: Some(FakeAnimator::default()),
            participant: false,
            destination: None,
            speed: 2.0,
            navigation_blocked: false,
            gestures: Vec::new(),
        }
    }

    /// Returns whether the component in `slot` is enabled.
    #[must_use]
    pub fn is_enabled(&self, slot: CapabilitySlot) -> Option<bool> {
        self.capabilities
            .iter()
            .find(|c| c.slot == slot)
            .map(|c| c.enabled)
    }

    fn set_enabled(&mut self, slot: CapabilitySlot, enabled: bool) {
        if let Some(capability) = self.capabilities.iter_mut().find(|c| c.slot == slot) {
            capability.enabled = enabled;
        }
    }
}

/// Simulated shot camera.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeCamera {
    pub placement: ShotPlacement,
    pub priority: i32,
}

/// Simulated sequence instance.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeSequence {
    pub asset: SequenceAssetId,
    pub tracks: Vec<String>,
    pub duration: Option<f32>,
    pub elapsed: f32,
    pub playing: bool,
    pub bindings: BTreeMap<String, BindingTarget>,
}

/// In-memory scene implementing every host seam.
#[derive(Debug, Default)]
pub struct FakeScene {
    actors: HashMap<ActorId, FakeActor>,
    order: Vec<ActorId>,
    clips: HashMap<ClipId, f32>,
    default_priority: i32,
    cameras: HashMap<CameraId, FakeCamera>,
    sequence_assets: HashMap<SequenceAssetId, (Vec<String>, Option<f32>)>,
    sequences: HashMap<SequenceInstanceId, FakeSequence>,
    spawned: Vec<ActorId>,
    refuse_spawns: bool,
    /// Every mutating call, in order.
    pub calls: Vec<SceneCall>,
}

impl FakeScene {
    /// An empty scene whose gameplay camera has priority 10.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_priority: 10,
            ..Self::default()
        }
    }

    /// Adds an actor and returns its ID.
    pub fn add_actor(&mut self, actor: FakeActor) -> ActorId {
        let id = ActorId::new();
        self.actors.insert(id, actor);
        self.order.push(id);
        id
    }

    /// Adds a standard participant at `position`.
    pub fn add_participant(&mut self, position: Vec3) -> ActorId {
        self.add_actor(FakeActor::participant(Pose::at(position)))
    }

    /// Registers a clip length.
    pub fn add_clip(&mut self, clip: &str, length: f32) {
        self.clips.insert(ClipId::from(clip), length);
    }

    /// Registers a sequence asset with its tracks and duration (`None` never
    /// finishes on its own).
    pub fn add_sequence_asset(&mut self, asset: &str, tracks: &[&str], duration: Option<f32>) {
        self.sequence_assets.insert(
            SequenceAssetId::from(asset),
            (tracks.iter().map(|t| (*t).to_owned()).collect(), duration),
        );
    }

    /// Makes the actor's animator ignore cross-fades.
    pub fn stick_animator(&mut self, actor: ActorId) {
        if let Some(animator) = self.actor_mut(actor).and_then(|a| a.animator.as_mut()) {
            animator.stuck = true;
        }
    }

    /// Makes the actor unable to make progress along paths.
    pub fn block_navigation(&mut self, actor: ActorId) {
        if let Some(a) = self.actor_mut(actor) {
            a.navigation_blocked = true;
        }
    }

    /// Makes every later `spawn_substitute` fail.
    pub fn refuse_spawns(&mut self) {
        self.refuse_spawns = true;
    }

    /// Looks up an actor.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&FakeActor> {
        self.actors.get(&id)
    }

    /// Mutable access to an actor.
    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut FakeActor> {
        self.actors.get_mut(&id)
    }

    /// Looks up a shot camera.
    #[must_use]
    pub fn camera(&self, id: CameraId) -> Option<&FakeCamera> {
        self.cameras.get(&id)
    }

    /// Number of shot cameras currently alive.
    #[must_use]
    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    /// Looks up a sequence instance.
    #[must_use]
    pub fn sequence(&self, id: SequenceInstanceId) -> Option<&FakeSequence> {
        self.sequences.get(&id)
    }

    /// Number of sequence instances currently loaded.
    #[must_use]
    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    /// Every substitute ever spawned, alive or not.
    #[must_use]
    pub fn spawned(&self) -> &[ActorId] {
        &self.spawned
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count_calls(&self, predicate: impl Fn(&SceneCall) -> bool) -> usize {
        self.calls.iter().filter(|c| predicate(c)).count()
    }

    /// Advances the simulation by `delta` seconds.
    pub fn advance(&mut self, delta: f32) {
        for actor in self.actors.values_mut() {
            if let Some(animator) = actor.animator.as_mut() {
                if animator.in_transition {
                    animator.in_transition = false;
                } else if animator.playing_length > 0.0 {
                    animator.normalized_time += delta / animator.playing_length;
                }
            }
            if let Some(destination) = actor.destination {
                if !actor.navigation_blocked {
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
        }
        for sequence in self.sequences.values_mut() {
            if sequence.playing {
                sequence.elapsed += delta;
            }
        }
    }
}

impl ActorRig for FakeScene {
    fn is_alive(&self, actor: ActorId) -> bool {
        self.actors.contains_key(&actor)
    }

    fn pose(&self, actor: ActorId) -> Option<Pose> {
        self.actors.get(&actor).map(|a| a.pose)
    }

    fn set_pose(&mut self, actor: ActorId, pose: Pose) {
        if let Some(a) = self.actors.get_mut(&actor) {
            a.pose = pose;
            self.calls.push(SceneCall::PoseSet { actor });
        }
    }

    fn capabilities(&self, actor: ActorId) -> Vec<Capability> {
        self.actors
            .get(&actor)
            .map(|a| a.capabilities.clone())
            .unwrap_or_default()
    }

    fn set_behaviour_enabled(&mut self, actor: ActorId, index: u16, enabled: bool) {
        let slot = CapabilitySlot::Behaviour(index);
        if let Some(a) = self.actors.get_mut(&actor) {
            a.set_enabled(slot, enabled);
        }
        self.calls.push(SceneCall::CapabilityToggled { actor, slot, enabled });
    }

    fn set_collider_enabled(&mut self, actor: ActorId, enabled: bool) {
        let slot = CapabilitySlot::Collider;
        if let Some(a) = self.actors.get_mut(&actor) {
            a.set_enabled(slot, enabled);
        }
        self.calls.push(SceneCall::CapabilityToggled { actor, slot, enabled });
    }

    fn set_navigation_enabled(&mut self, actor: ActorId, enabled: bool) {
        let slot = CapabilitySlot::NavigationAgent;
        if let Some(a) = self.actors.get_mut(&actor) {
            a.set_enabled(slot, enabled);
        }
        self.calls.push(SceneCall::CapabilityToggled { actor, slot, enabled });
    }

    fn ik_weight(&self, actor: ActorId) -> Option<f32> {
        self.actors.get(&actor).and_then(|a| a.ik_weight)
    }

    fn set_ik_weight(&mut self, actor: ActorId, weight: f32) {
        if let Some(current) = self.actors.get_mut(&actor).and_then(|a| a.ik_weight.as_mut()) {
            *current = weight;
            self.calls.push(SceneCall::IkWeightSet { actor, weight });
        }
    }
}

impl AnimationDriver for FakeScene {
    fn has_animator(&self, actor: ActorId) -> bool {
        self.actors.get(&actor).is_some_and(|a| a.animator.is_some())
    }

    fn override_clip(&mut self, actor: ActorId, slot: &str, clip: &ClipId) -> bool {
        let Some(animator) = self.actors.get_mut(&actor).and_then(|a| a.animator.as_mut()) else {
            return false;
        };
        animator.overrides.insert(slot.to_owned(), clip.clone());
        self.calls.push(SceneCall::ClipOverridden {
            actor,
            slot: slot.to_owned(),
            clip: clip.clone(),
        });
        true
    }

    fn clear_overrides(&mut self, actor: ActorId) {
        if let Some(animator) = self.actors.get_mut(&actor).and_then(|a| a.animator.as_mut()) {
            animator.overrides.clear();
            animator.state = "Locomotion".to_owned();
            animator.normalized_time = 0.0;
            animator.playing_length = UNKNOWN_CLIP_LENGTH;
            self.calls.push(SceneCall::OverridesCleared { actor });
        }
    }

    fn cross_fade(&mut self, actor: ActorId, state: &str, transition: f32, interrupt: bool) {
        self.calls.push(SceneCall::CrossFade {
            actor,
            state: state.to_owned(),
            interrupt,
        });
        let clips = &self.clips;
        let Some(animator) = self.actors.get_mut(&actor).and_then(|a| a.animator.as_mut()) else {
            return;
        };
        if animator.stuck {
            return;
        }
        animator.playing_length = animator
            .overrides
            .values()
            .next_back()
            .and_then(|clip| clips.get(clip).copied())
            .unwrap_or(UNKNOWN_CLIP_LENGTH);
        animator.state = state.to_owned();
        animator.normalized_time = 0.0;
        animator.in_transition = transition > 0.0;
    }

    fn animator_state(&self, actor: ActorId) -> Option<AnimatorState> {
        self.actors
            .get(&actor)
            .and_then(|a| a.animator.as_ref())
            .map(|animator| AnimatorState {
                state: animator.state.clone(),
                normalized_time: animator.normalized_time,
                in_transition: animator.in_transition,
            })
    }

    fn clip_length(&self, clip: &ClipId) -> Option<f32> {
        self.clips.get(clip).copied()
    }
}

impl CameraRig for FakeScene {
    fn default_priority(&self) -> i32 {
        self.default_priority
    }

    fn spawn_shot(&mut self, placement: &ShotPlacement) -> Option<CameraId> {
        let camera = CameraId::new();
        self.cameras.insert(
            camera,
            FakeCamera {
                placement: placement.clone(),
                priority: 0,
            },
        );
        self.calls.push(SceneCall::ShotSpawned { camera });
        Some(camera)
    }

    fn priority(&self, camera: CameraId) -> Option<i32> {
        self.cameras.get(&camera).map(|c| c.priority)
    }

    fn set_priority(&mut self, camera: CameraId, priority: i32) {
        if let Some(c) = self.cameras.get_mut(&camera) {
            c.priority = priority;
        }
        self.calls.push(SceneCall::PrioritySet { camera, priority });
    }

    fn despawn_shot(&mut self, camera: CameraId) {
        self.cameras.remove(&camera);
        self.calls.push(SceneCall::ShotDespawned { camera });
    }
}

impl SequenceDirector for FakeScene {
    fn load_sequence(&mut self, asset: &SequenceAssetId) -> Option<SequenceInstanceId> {
        let (tracks, duration) = self.sequence_assets.get(asset)?.clone();
        let instance = SequenceInstanceId::new();
        self.sequences.insert(
            instance,
            FakeSequence {
                asset: asset.clone(),
                tracks,
                duration,
                elapsed: 0.0,
                playing: false,
                bindings: BTreeMap::new(),
            },
        );
        self.calls.push(SceneCall::SequenceLoaded { instance });
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
        self.calls.push(SceneCall::TrackBound {
            instance,
            track: track.to_owned(),
            target,
        });
    }

    fn clear_track(&mut self, instance: SequenceInstanceId, track: &str) {
        if let Some(sequence) = self.sequences.get_mut(&instance) {
            sequence.bindings.remove(track);
        }
        self.calls.push(SceneCall::TrackCleared {
            instance,
            track: track.to_owned(),
        });
    }

    fn play(&mut self, instance: SequenceInstanceId) {
        if let Some(sequence) = self.sequences.get_mut(&instance) {
            sequence.playing = true;
            sequence.elapsed = 0.0;
        }
        self.calls.push(SceneCall::SequencePlayed { instance });
    }

    fn is_finished(&self, instance: SequenceInstanceId) -> bool {
        self.sequences.get(&instance).is_none_or(|s| {
            s.playing && s.duration.is_some_and(|duration| s.elapsed >= duration)
        })
    }

    fn duration(&self, instance: SequenceInstanceId) -> Option<f32> {
        self.sequences.get(&instance).and_then(|s| s.duration)
    }

    fn stop(&mut self, instance: SequenceInstanceId) {
        self.sequences.remove(&instance);
        self.calls.push(SceneCall::SequenceStopped { instance });
    }
}

impl ParticipantDirectory for FakeScene {
    fn participants_near(&self, center: Vec3, radius: f32) -> Vec<ActorId> {
        self.order
            .iter()
            .filter(|id| {
                self.actors.get(id).is_some_and(|a| {
                    a.participant && a.pose.position.distance(center) <= radius
                })
            })
            .copied()
            .collect()
    }
}

impl ActorSpawner for FakeScene {
    fn spawn_substitute(&mut self, _template: &str, pose: Pose) -> Option<ActorId> {
        if self.refuse_spawns {
            return None;
        }
        let actor = self.add_actor(FakeActor::substitute(pose));
        self.spawned.push(actor);
        self.calls.push(SceneCall::Spawned { actor });
        Some(actor)
    }

    fn despawn(&mut self, actor: ActorId) {
        self.actors.remove(&actor);
        self.order.retain(|id| *id != actor);
        self.calls.push(SceneCall::Despawned { actor });
    }
}

impl Navigator for FakeScene {
    fn set_destination(&mut self, actor: ActorId, destination: Vec3) -> bool {
        let Some(a) = self.actors.get_mut(&actor) else {
            return false;
        };
        a.destination = Some(destination);
        self.calls.push(SceneCall::DestinationSet { actor, destination });
        true
    }

    fn remaining_distance(&self, actor: ActorId) -> Option<f32> {
        let a = self.actors.get(&actor)?;
        Some(
            a.destination
                .map_or(0.0, |destination| a.pose.position.distance(destination)),
        )
    }

    fn stop(&mut self, actor: ActorId) {
        if let Some(a) = self.actors.get_mut(&actor) {
            a.destination = None;
        }
        self.calls.push(SceneCall::NavigationStopped { actor });
    }

    fn play_gesture(&mut self, actor: ActorId, gesture: &str) {
        if let Some(a) = self.actors.get_mut(&actor) {
            a.gestures.push(gesture.to_owned());
        }
        self.calls.push(SceneCall::Gesture {
            actor,
            gesture: gesture.to_owned(),
        });
    }
}
