//! Route modules, one per resource.

pub mod anchors;
pub mod executions;
pub mod health;
pub mod participants;

#[cfg(test)]
pub(crate) mod fixtures;
