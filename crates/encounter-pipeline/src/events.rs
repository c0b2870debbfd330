//! Domain events emitted by executions.

use encounter_core::clock::Clock;
use encounter_core::event::{DomainEvent, EventMetadata};
use encounter_core::ids::{ActorId, AnchorId, ExecutionHandle, TriggerId};
use encounter_playback::context::Phase;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::completion::ExecutionOutcome;

/// Emitted when a request is approved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequested {
    pub trigger_id: TriggerId,
    pub anchor_id: AnchorId,
    pub initiator: ActorId,
}

/// Emitted when partner resolution finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerResolved {
    pub partner: Option<ActorId>,
    /// `none`, `live` or `substitute`.
    pub kind: String,
}

/// Emitted on every phase change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseEntered {
    pub phase: Phase,
}

/// Emitted for each sequence track left unbound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingUnresolved {
    pub track: String,
}

/// Emitted when playback hits its safety timeout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackTimedOut {
    pub after_seconds: f32,
}

/// Emitted when a cancel (or force-stop) is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelRequested {
    /// Phase the execution was in when the request arrived.
    pub phase: Phase,
}

/// Emitted once, after restoration, with the final outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionFinished {
    pub outcome: ExecutionOutcome,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionEventKind {
    ExecutionRequested(ExecutionRequested),
    PartnerResolved(PartnerResolved),
    PhaseEntered(PhaseEntered),
    BindingUnresolved(BindingUnresolved),
    PlaybackTimedOut(PlaybackTimedOut),
    CancelRequested(CancelRequested),
    ExecutionFinished(ExecutionFinished),
}

/// Domain event envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionEvent {
    pub metadata: EventMetadata,
    pub kind: ExecutionEventKind,
}

impl DomainEvent for ExecutionEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            ExecutionEventKind::ExecutionRequested(_) => "execution.requested",
            ExecutionEventKind::PartnerResolved(_) => "execution.partner_resolved",
            ExecutionEventKind::PhaseEntered(_) => "execution.phase_entered",
            ExecutionEventKind::BindingUnresolved(_) => "execution.binding_unresolved",
            ExecutionEventKind::PlaybackTimedOut(_) => "execution.playback_timed_out",
            ExecutionEventKind::CancelRequested(_) => "execution.cancel_requested",
            ExecutionEventKind::ExecutionFinished(_) => "execution.finished",
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(&self.kind).unwrap_or_default()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

/// Numbers the events of one execution stream.
#[derive(Debug, Clone)]
pub(crate) struct EventStream {
    handle: ExecutionHandle,
    correlation_id: Uuid,
    next_sequence: i64,
}

impl EventStream {
    pub(crate) fn new(handle: ExecutionHandle) -> Self {
        Self {
            handle,
            correlation_id: Uuid::new_v4(),
            next_sequence: 1,
        }
    }

    /// Wraps `kind` in the next envelope of this stream.
    pub(crate) fn record(&mut self, clock: &dyn Clock, kind: ExecutionEventKind) -> ExecutionEvent {
        let mut event = ExecutionEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: String::new(),
                execution: self.handle,
                sequence_number: self.next_sequence,
                correlation_id: self.correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };
        event.metadata.event_type = event.event_type().to_owned();
        self.next_sequence += 1;
        event
    }
}
