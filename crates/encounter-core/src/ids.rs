//! Identifier newtypes.
//!
//! Runtime objects (actors, cameras, sequence instances, executions) are
//! identified by UUIDs minted at runtime. Configuration entries (triggers,
//! anchors, clips, sequence assets) keep the stable string IDs they were
//! authored with.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! runtime_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Mints a fresh random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

macro_rules! config_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

runtime_id!(
    /// A participant, substitute or any other animated actor in the scene.
    ActorId
);
runtime_id!(
    /// Handle returned to callers for one trigger execution.
    ExecutionHandle
);
runtime_id!(
    /// A virtual camera created for a cinematic shot.
    CameraId
);
runtime_id!(
    /// A non-actor scene object (props, interactables).
    SceneObjectId
);
runtime_id!(
    /// A loaded, playable instance of a sequence asset.
    SequenceInstanceId
);

config_id!(
    /// Stable identifier of a trigger definition.
    TriggerId
);
config_id!(
    /// Stable identifier of an interaction anchor.
    AnchorId
);
config_id!(
    /// Reference to an animation clip asset.
    ClipId
);
config_id!(
    /// Reference to a multi-track sequence asset.
    SequenceAssetId
);
