use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;

use tracing::{debug, info, info_span, warn};

use crate::vcs::{AuthContext, VcsClient};

use super::events::{ActionEvent, ActionId, EventBridge, EventCode};
use super::tracer::{EventTracer, Tracer, TracerSlot};
use super::{ActionError, ActionKind};

static NEXT_ACTION_ID: AtomicU64 = AtomicU64::new(1);

/// Result of the configuration dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    Confirmed,
    Cancelled,
}

/// Modal options dialog shown on the UI thread before a worker starts.
pub trait ActionDialog {
    fn show_modal(&mut self, kind: &mut ActionKind, targets: &[String]) -> DialogOutcome;
}

/// An outcome that was already decided, e.g. by a dialog drawn over several frames.
impl ActionDialog for DialogOutcome {
    fn show_modal(&mut self, _kind: &mut ActionKind, _targets: &[String]) -> DialogOutcome {
        *self
    }
}

/// A target whose client call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFailure {
    pub target: String,
    pub message: String,
}

/// Tally of one batch, carried on the terminal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSummary {
    pub action: ActionId,
    pub label: String,
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<TargetFailure>,
}

impl ActionSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// One-line status text.
    pub fn describe(&self) -> String {
        if self.is_success() {
            format!("{} finished: {} of {} done", self.label, self.succeeded, self.total)
        } else {
            format!(
                "{} finished with errors: {} of {} failed",
                self.label,
                self.failed(),
                self.total
            )
        }
    }
}

/// One user-invoked operation over a list of targets.
pub struct FileAction {
    id: ActionId,
    kind: ActionKind,
    targets: Vec<String>,
    bridge: EventBridge,
    client: Arc<dyn VcsClient>,
    tracer: Option<TracerSlot>,
    context: Option<AuthContext>,
}

impl std::fmt::Debug for FileAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileAction")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("targets", &self.targets)
            .field("tracer", &self.tracer)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl FileAction {
    pub fn new(
        kind: ActionKind,
        targets: Vec<String>,
        bridge: EventBridge,
        client: Arc<dyn VcsClient>,
    ) -> Self {
        Self {
            id: NEXT_ACTION_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            targets,
            bridge,
            client,
            tracer: None,
            context: None,
        }
    }

    /// Send trace lines to `tracer` instead of posting them as events.
    pub fn with_tracer(mut self, tracer: TracerSlot) -> Self {
        self.tracer = Some(tracer);
        self
    }

    pub fn with_context(mut self, context: Option<AuthContext>) -> Self {
        self.context = context;
        self
    }

    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Show the dialog and, if confirmed, start the worker.
    ///
    /// Must be called on the UI thread. Returns `Ok(None)` when the user
    /// cancels; no thread exists in that case.
    pub fn perform_action(
        mut self,
        dialog: &mut dyn ActionDialog,
    ) -> Result<Option<ActionHandle>, ActionError> {
        if self.targets.is_empty() {
            return Err(ActionError::InvalidOptions(format!(
                "{} needs at least one target",
                self.kind.label()
            )));
        }
        if dialog.show_modal(&mut self.kind, &self.targets) == DialogOutcome::Cancelled {
            debug!(action = self.id, "{} cancelled", self.kind.label());
            return Ok(None);
        }
        self.kind.validate(&self.targets)?;

        let Self {
            id,
            kind,
            targets,
            bridge,
            client,
            tracer,
            context,
        } = self;
        let handle_kind = kind.clone();
        let tracer =
            tracer.unwrap_or_else(|| TracerSlot::Owned(Box::new(EventTracer::new(bridge.clone(), id))));
        info!(action = id, targets = targets.len(), "Starting {}", kind.label());

        let join = std::thread::Builder::new()
            .name(format!("action-{id}"))
            .spawn(move || {
                let span = info_span!("action", id, kind = kind.label());
                let _entered = span.enter();
                run_batch(
                    id,
                    &kind,
                    &targets,
                    client.as_ref(),
                    context.as_ref(),
                    &tracer,
                    |event| {
                        bridge.post(event);
                    },
                )
            })
            .map_err(ActionError::Spawn)?;

        Ok(Some(ActionHandle {
            id,
            kind: handle_kind,
            join,
        }))
    }
}

/// Running worker of a confirmed action.
#[derive(Debug)]
pub struct ActionHandle {
    id: ActionId,
    kind: ActionKind,
    join: JoinHandle<ActionSummary>,
}

impl ActionHandle {
    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the worker. It posts nothing after its terminal event, so
    /// joining after [`EventCode::ActionEnd`] arrives does not block for long.
    pub fn join(self) -> Result<ActionSummary, ActionError> {
        self.join.join().map_err(|_| ActionError::WorkerPanicked(self.id))
    }
}

/// Worker body: attempt every target once, report failures, then post the
/// terminal event.
pub fn run_batch<F>(
    id: ActionId,
    kind: &ActionKind,
    targets: &[String],
    client: &dyn VcsClient,
    context: Option<&AuthContext>,
    tracer: &dyn Tracer,
    mut post: F,
) -> ActionSummary
where
    F: FnMut(ActionEvent),
{
    let label = kind.label();
    let mut succeeded = 0usize;
    let mut failures = Vec::new();

    for target in targets {
        tracer.trace(&format!("{label}: {target}"));
        match kind.execute_one(client, target, context) {
            Ok(output) => {
                for line in output.lines().filter(|line| !line.trim().is_empty()) {
                    tracer.trace(line);
                }
                succeeded += 1;
            }
            Err(err) => {
                let message = err.to_string();
                warn!(path = %target, "{label} failed: {message}");
                tracer.trace(&format!("{label} failed:"));
                tracer.trace(&message);
                post(ActionEvent::string(
                    id,
                    EventCode::InternalError,
                    format!("{target}: {message}"),
                ));
                failures.push(TargetFailure {
                    target: target.clone(),
                    message,
                });
            }
        }
    }

    let summary = ActionSummary {
        action: id,
        label: label.to_string(),
        total: targets.len(),
        succeeded,
        failures,
    };
    info!(
        succeeded = summary.succeeded,
        failed = summary.failed(),
        "{label} done"
    );
    post(ActionEvent::data(id, EventCode::ActionEnd, Some(summary.clone())));
    summary
}
