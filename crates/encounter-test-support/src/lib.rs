//! Shared test fakes and utilities for the Encounter pipeline.

mod clock;
mod rng;
mod scene;

pub use clock::{FixedClock, fixed_clock};
pub use rng::{FractionRng, MockRng, SequenceRng};
pub use scene::{FakeActor, FakeAnimator, FakeCamera, FakeSequence, FakeScene, SceneCall};
