//! Completion reporting.

use encounter_core::ids::{ActorId, AnchorId, ExecutionHandle, TriggerId};
use serde::{Deserialize, Serialize};

/// How an execution ended. None of these are errors: every execution
/// unwinds and reports exactly one outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// Played to the end.
    Completed,
    /// Played until the safety timeout fired.
    CompletedAfterTimeout,
    /// The trigger needed a partner and none was available. Nothing played.
    NoPartnerAvailable,
    /// Cancelled or force-stopped.
    Cancelled,
}

impl ExecutionOutcome {
    /// Returns `true` unless the execution was cancelled.
    #[must_use]
    pub fn is_completed(self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Lowercase name, as used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::CompletedAfterTimeout => "completed_after_timeout",
            Self::NoPartnerAvailable => "no_partner_available",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Summary handed to the completion listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub handle: ExecutionHandle,
    pub trigger_id: TriggerId,
    pub anchor_id: AnchorId,
    pub initiator: ActorId,
    pub partner: Option<ActorId>,
    /// Whether the partner was a spawned substitute.
    pub substituted: bool,
    pub outcome: ExecutionOutcome,
}

/// Receives one report per finished execution.
pub trait CompletionListener: Send {
    /// Called once the execution is `Completed` or `Cancelled`, after every
    /// participant's control has been restored.
    fn on_complete(&mut self, report: &ExecutionReport);
}
