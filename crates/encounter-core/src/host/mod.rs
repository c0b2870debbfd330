//! Engine-facing seams.
//!
//! The pipeline never touches engine objects directly. Everything it needs
//! from the scene (poses, toggleable components, IK solvers, animators,
//! cameras, sequences, spawning and navigation) goes through the traits in
//! this module, which an engine integration implements once. Each pipeline
//! component bounds itself only by the traits it uses; the orchestrator
//! takes the combined [`SceneHost`].

mod animation;
mod camera;
mod population;
mod rig;
mod sequence;

pub use animation::{AnimationDriver, AnimatorState};
pub use camera::CameraRig;
pub use population::{ActorSpawner, Navigator, ParticipantDirectory};
pub use rig::{ActorRig, Capability, CapabilityRole, CapabilitySlot};
pub use sequence::{BindingTarget, SequenceDirector};

/// Everything the orchestrator needs from the scene.
pub trait SceneHost:
    ActorRig
    + AnimationDriver
    + CameraRig
    + SequenceDirector
    + ActorSpawner
    + Navigator
    + ParticipantDirectory
{
}

impl<T> SceneHost for T where
    T: ActorRig
        + AnimationDriver
        + CameraRig
        + SequenceDirector
        + ActorSpawner
        + Navigator
        + ParticipantDirectory
        + ?Sized
{
}
