//! Encounter — staging around a sequence.
//!
//! Everything an execution does to participants before and after the
//! authored content plays: sliding them onto anchor slots, taking away and
//! handing back their normal control, moving the shot camera's priority and
//! handing IK influence to the animation and back.

pub mod camera;
pub mod control_lock;
pub mod ik;
pub mod positioning;
