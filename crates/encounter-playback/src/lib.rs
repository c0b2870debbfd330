//! Encounter — track binding, execution context and playback strategies.
//!
//! A trigger plays either a single animation through an animator override
//! slot or a multi-track cinematic. Both are [`strategy::Playback`]
//! implementations resumed once per tick against the per-execution
//! [`context::ExecutionContext`].

pub mod binding;
pub mod cinematic;
pub mod context;
pub mod direct;
pub mod strategy;
