//! Pipeline error types.
//!
//! Only rejections are errors. Degradations that happen while an execution
//! runs (no partner, unbound tracks, timeouts, cancellation) are reported as
//! outcomes and events instead, because an execution must always unwind.

use thiserror::Error;

use crate::ids::{ActorId, AnchorId, ExecutionHandle, TriggerId};

/// Top-level error type for requests made to the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The anchor already has an active execution.
    #[error("anchor {0} is already executing a trigger")]
    AlreadyExecuting(AnchorId),

    /// The participant is already taking part in another execution.
    #[error("participant {0} is busy in another execution")]
    ParticipantBusy(ActorId),

    /// No trigger definition with this ID is loaded.
    #[error("trigger not found: {0}")]
    TriggerNotFound(TriggerId),

    /// No anchor with this ID is configured.
    #[error("anchor not found: {0}")]
    AnchorNotFound(AnchorId),

    /// The trigger exists but the anchor does not offer it.
    #[error("trigger {trigger} is not offered at anchor {anchor}")]
    TriggerNotOffered {
        /// The requested trigger.
        trigger: TriggerId,
        /// The anchor it was requested at.
        anchor: AnchorId,
    },

    /// No active execution has this handle.
    #[error("execution not found: {0}")]
    ExecutionNotFound(ExecutionHandle),

    /// Static configuration is inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A request was malformed.
    #[error("validation error: {0}")]
    Validation(String),
}
