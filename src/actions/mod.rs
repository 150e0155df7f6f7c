//! Background actions: configure on the UI thread, run on a worker, report back.
//!
//! A [`FileAction`] shows its options dialog, then spawns exactly one worker
//! thread that calls the [`VcsClient`](crate::vcs::VcsClient) for each
//! target. Workers never touch the tree; they talk to the UI thread only
//! through the [`EventBridge`]. Per-target failures are reported and skipped,
//! and every worker ends with a single [`EventCode::ActionEnd`] event.

mod events;
mod kind;
mod runner;
mod tracer;

#[cfg(test)]
mod tests;

pub use events::{
    ActionEvent, ActionId, EventBridge, EventCode, EventKind, EventQueue, event_channel,
};
pub use kind::ActionKind;
pub use runner::{
    ActionDialog, ActionHandle, ActionSummary, DialogOutcome, FileAction, TargetFailure,
    run_batch,
};
pub use tracer::{EventTracer, LogTracer, MemoryTracer, Tracer, TracerSlot};

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
    #[error("Failed to start worker thread: {0}")]
    Spawn(std::io::Error),
    #[error("Worker of action {0} panicked")]
    WorkerPanicked(ActionId),
}
