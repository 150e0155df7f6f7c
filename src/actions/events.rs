use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use super::ActionSummary;

/// Identifier assigned to each action when it is constructed.
pub type ActionId = u64;

/// What a posted event means to the UI thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCode {
    /// A line of progress text.
    Trace,
    /// A per-target failure, shown with an `internal error` marker.
    InternalError,
    /// Terminal event of an action; posted exactly once per worker.
    ActionEnd,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    String { code: EventCode, text: String },
    Data {
        code: EventCode,
        payload: Option<ActionSummary>,
    },
}

/// Message posted from a worker to the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionEvent {
    pub action: ActionId,
    pub kind: EventKind,
}

impl ActionEvent {
    pub fn string(action: ActionId, code: EventCode, text: impl Into<String>) -> Self {
        Self {
            action,
            kind: EventKind::String {
                code,
                text: text.into(),
            },
        }
    }

    pub fn data(action: ActionId, code: EventCode, payload: Option<ActionSummary>) -> Self {
        Self {
            action,
            kind: EventKind::Data { code, payload },
        }
    }

    pub fn code(&self) -> EventCode {
        match &self.kind {
            EventKind::String { code, .. } | EventKind::Data { code, .. } => *code,
        }
    }
}

type Waker = Arc<dyn Fn() + Send + Sync>;

/// Sending half held by workers. Cloning is cheap; every clone feeds the same queue.
#[derive(Clone)]
pub struct EventBridge {
    sender: Sender<ActionEvent>,
    waker: Option<Waker>,
}

impl fmt::Debug for EventBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBridge")
            .field("waker", &self.waker.is_some())
            .finish_non_exhaustive()
    }
}

/// Receiving half drained by the UI thread.
#[derive(Debug)]
pub struct EventQueue {
    receiver: Receiver<ActionEvent>,
}

/// Create a connected bridge and queue.
pub fn event_channel() -> (EventBridge, EventQueue) {
    let (sender, receiver) = mpsc::channel();
    (
        EventBridge {
            sender,
            waker: None,
        },
        EventQueue { receiver },
    )
}

impl EventBridge {
    /// Call `waker` after every post so an idle UI repaints.
    pub fn with_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.waker = Some(Arc::new(waker));
        self
    }

    /// Returns false once the queue has been dropped.
    pub fn post(&self, event: ActionEvent) -> bool {
        let delivered = self.sender.send(event).is_ok();
        if delivered && let Some(waker) = &self.waker {
            waker();
        }
        delivered
    }

    pub fn post_string(&self, action: ActionId, code: EventCode, text: impl Into<String>) -> bool {
        self.post(ActionEvent::string(action, code, text))
    }

    pub fn post_data(
        &self,
        action: ActionId,
        code: EventCode,
        payload: Option<ActionSummary>,
    ) -> bool {
        self.post(ActionEvent::data(action, code, payload))
    }
}

impl EventQueue {
    pub fn try_recv(&self) -> Option<ActionEvent> {
        self.receiver.try_recv().ok()
    }

    /// Everything posted so far, in arrival order.
    pub fn drain(&self) -> Vec<ActionEvent> {
        self.receiver.try_iter().collect()
    }
}
