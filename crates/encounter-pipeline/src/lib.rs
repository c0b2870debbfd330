//! Encounter — trigger execution orchestrator.
//!
//! The [`orchestrator::TriggerOrchestrator`] accepts execution requests,
//! drives every active execution one step per tick through
//! `ResolvingPartner → Positioning → Playing → Restoring`, and reports each
//! one to the completion listener once it is `Completed` or `Cancelled`.
//! Every exit path, including cancellation and force-stop, unwinds through
//! the same restoration routine.

pub mod completion;
pub mod events;
mod execution;
pub mod orchestrator;
mod restore;

pub use completion::{CompletionListener, ExecutionOutcome, ExecutionReport};
pub use encounter_playback::context::Phase;
pub use events::{ExecutionEvent, ExecutionEventKind};
pub use execution::ExecutionSnapshot;
pub use orchestrator::{PipelineServices, TriggerOrchestrator};
