//! Control Lock Manager.
//!
//! While a sequence owns a participant, everything that would normally move
//! or animate it from gameplay input is switched off. [`acquire`] walks each
//! participant's capability registry and disables the enabled movement and
//! animation-drive components; [`release`] consumes the resulting set and switches exactly
//! those components back on.

use encounter_core::host::{ActorRig, CapabilitySlot};
use encounter_core::ids::ActorId;
use tracing::{debug, warn};

/// One component disabled by [`acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockedCapability {
    /// A behaviour component, by registry index.
    Behaviour { actor: ActorId, index: u16 },
    /// The actor's collider.
    Collider { actor: ActorId },
    /// The actor's navigation agent.
    NavigationAgent { actor: ActorId },
}

impl LockedCapability {
    fn new(actor: ActorId, slot: CapabilitySlot) -> Self {
        match slot {
            CapabilitySlot::Behaviour(index) => Self::Behaviour { actor, index },
            CapabilitySlot::Collider => Self::Collider { actor },
            CapabilitySlot::NavigationAgent => Self::NavigationAgent { actor },
        }
    }

    /// The actor owning the component.
    #[must_use]
    pub fn actor(&self) -> ActorId {
        match *self {
            Self::Behaviour { actor, .. }
            | Self::Collider { actor }
            | Self::NavigationAgent { actor } => actor,
        }
    }
}

/// Components disabled for one execution.
///
/// The set is not `Clone` and [`release`] takes it by value, so it is handed
/// back at most once.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a disabled component set must be released"]
pub struct DisabledComponentSet {
    entries: Vec<LockedCapability>,
}

impl DisabledComponentSet {
    /// Number of disabled components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was disabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The disabled components, in the order they were disabled.
    pub fn iter(&self) -> impl Iterator<Item = &LockedCapability> {
        self.entries.iter()
    }
}

/// Disables every enabled movement and animation-drive component of each
/// participant. Components that are already off are not recorded, so they
/// stay off after release. Presentation components are left running.
pub fn acquire<H: ActorRig + ?Sized>(host: &mut H, participants: &[ActorId]) -> DisabledComponentSet {
    let mut entries = Vec::new();
    for &actor in participants {
        for capability in host.capabilities(actor) {
            if !capability.enabled || !capability.role.is_locked_during_playback() {
                continue;
            }
            let locked = LockedCapability::new(actor, capability.slot);
            set_enabled(host, locked, false);
            entries.push(locked);
        }
    }
    debug!(participants = participants.len(), disabled = entries.len(), "control lock acquired");
    DisabledComponentSet { entries }
}

/// Re-enables every component in `set`. Returns how many were re-enabled;
/// components of actors that no longer exist are skipped.
pub fn release<H: ActorRig + ?Sized>(host: &mut H, set: DisabledComponentSet) -> usize {
    let mut restored = 0;
    for locked in set.entries {
        if !host.is_alive(locked.actor()) {
            warn!(actor = %locked.actor(), "locked actor vanished before release");
            continue;
        }
        set_enabled(host, locked, true);
        restored += 1;
    }
    debug!(restored, "control lock released");
    restored
}

fn set_enabled<H: ActorRig + ?Sized>(host: &mut H, locked: LockedCapability, enabled: bool) {
    match locked {
        LockedCapability::Behaviour { actor, index } => {
            host.set_behaviour_enabled(actor, index, enabled);
        }
        LockedCapability::Collider { actor } => host.set_collider_enabled(actor, enabled),
        LockedCapability::NavigationAgent { actor } => host.set_navigation_enabled(actor, enabled),
    }
}
