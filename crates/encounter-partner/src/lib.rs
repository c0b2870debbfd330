//! Encounter — partner resolution and substitute actors.
//!
//! A paired trigger needs a second actor. The resolver prefers a live
//! participant near the initiator and otherwise spawns a substitute, which
//! walks onto its slot ([`prepare::PrepareForRole`]) and idles autonomously
//! ([`brain::SubstituteBrain`]) whenever it is not interacting.

pub mod brain;
pub mod prepare;
pub mod resolver;
