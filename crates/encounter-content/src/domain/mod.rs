//! Configuration model.

pub mod anchors;
pub mod definitions;
pub mod tuning;
