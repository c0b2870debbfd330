//! Encounter Core — shared abstractions for the trigger execution pipeline.
//!
//! This crate defines the identifiers, pose math, determinism seams and
//! engine-facing host traits that every other crate depends on. It contains
//! no engine or infrastructure code.

pub mod clock;
pub mod error;
pub mod event;
pub mod host;
pub mod ids;
pub mod pose;
pub mod rng;
pub mod routine;
pub mod shot;
