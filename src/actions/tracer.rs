use std::sync::{Arc, Mutex};

use tracing::info;

use super::events::{ActionId, EventBridge, EventCode};

/// Sink for human-readable progress and error text.
pub trait Tracer {
    fn trace(&self, message: &str);
}

/// How an action holds its tracer, fixed at construction.
pub enum TracerSlot {
    /// The action owns the tracer and drops it with the worker.
    Owned(Box<dyn Tracer + Send>),
    /// The tracer outlives the action and may be shared with others.
    Shared(Arc<dyn Tracer + Send + Sync>),
}

impl Tracer for TracerSlot {
    fn trace(&self, message: &str) {
        match self {
            TracerSlot::Owned(tracer) => tracer.trace(message),
            TracerSlot::Shared(tracer) => tracer.trace(message),
        }
    }
}

impl std::fmt::Debug for TracerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TracerSlot::Owned(_) => f.write_str("TracerSlot::Owned"),
            TracerSlot::Shared(_) => f.write_str("TracerSlot::Shared"),
        }
    }
}

/// Forwards trace lines to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTracer;

impl Tracer for LogTracer {
    fn trace(&self, message: &str) {
        info!(target: "svnbrowser::trace", "{message}");
    }
}

/// Posts each line to the UI thread as a [`EventCode::Trace`] event.
#[derive(Debug, Clone)]
pub struct EventTracer {
    bridge: EventBridge,
    action: ActionId,
}

impl EventTracer {
    pub fn new(bridge: EventBridge, action: ActionId) -> Self {
        Self { bridge, action }
    }
}

impl Tracer for EventTracer {
    fn trace(&self, message: &str) {
        self.bridge
            .post_string(self.action, EventCode::Trace, message);
    }
}

/// Collects lines in memory; clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemoryTracer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl Tracer for MemoryTracer {
    fn trace(&self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_string());
        }
    }
}
