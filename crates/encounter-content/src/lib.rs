//! Encounter — trigger, anchor and tuning configuration.
//!
//! Definitions are loaded once from static configuration, validated, and
//! shared by reference across every execution. Nothing in this crate is
//! mutated at runtime.

pub mod application;
pub mod domain;
pub mod error;
