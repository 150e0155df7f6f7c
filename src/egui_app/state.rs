//! Plain UI state owned by the controller and drawn by the renderer.

use std::collections::VecDeque;

use crate::actions::ActionKind;
use crate::folder_browser::NodeId;

/// Oldest output lines are dropped beyond this count.
pub const MAX_OUTPUT_LINES: usize = 5000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    Idle,
    Busy,
    Info,
    Warning,
    Error,
}

impl StatusTone {
    pub fn label(self) -> &'static str {
        match self {
            StatusTone::Idle => "Idle",
            StatusTone::Busy => "Busy",
            StatusTone::Info => "Info",
            StatusTone::Warning => "Warning",
            StatusTone::Error => "Error",
        }
    }
}

/// Status badge + text shown in the footer.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusBarState {
    pub text: String,
    pub tone: StatusTone,
}

impl StatusBarState {
    pub fn idle() -> Self {
        Self {
            text: "Right-click Bookmarks to add a working copy or repository".into(),
            tone: StatusTone::Idle,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputKind {
    Trace,
    Error,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputLine {
    pub kind: OutputKind,
    pub text: String,
}

/// Rolling output pane fed by action events.
#[derive(Clone, Debug, Default)]
pub struct OutputLog {
    lines: VecDeque<OutputLine>,
}

impl OutputLog {
    pub fn push(&mut self, kind: OutputKind, text: impl Into<String>) {
        if self.lines.len() == MAX_OUTPUT_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(OutputLine {
            kind,
            text: text.into(),
        });
    }

    pub fn lines(&self) -> impl Iterator<Item = &OutputLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// Options dialog of an action, edited over several frames.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionPrompt {
    pub kind: ActionKind,
    pub targets: Vec<String>,
    /// Node the action was started from; refreshed when it finishes.
    pub origin: NodeId,
    pub revision: String,
    /// Second revision of a merge.
    pub revision2: String,
    pub destination: String,
    pub error: Option<String>,
}

impl ActionPrompt {
    pub fn new(kind: ActionKind, targets: Vec<String>, origin: NodeId) -> Self {
        Self {
            kind,
            targets,
            origin,
            revision: "HEAD".into(),
            revision2: "HEAD".into(),
            destination: String::new(),
            error: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginPrompt {
    pub bookmark: String,
    pub username: String,
    pub password: String,
    /// Applies to the shared login rather than the bookmark's own.
    pub shared: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepoBookmarkPrompt {
    pub url: String,
    pub error: Option<String>,
}

/// At most one modal window is open at a time.
#[derive(Clone, Debug, PartialEq)]
pub enum Prompt {
    Action(ActionPrompt),
    Login(LoginPrompt),
    AddRepoBookmark(RepoBookmarkPrompt),
}

#[derive(Clone, Debug)]
pub struct UiState {
    pub status: StatusBarState,
    pub output: OutputLog,
    pub prompt: Option<Prompt>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            status: StatusBarState::idle(),
            output: OutputLog::default(),
            prompt: None,
        }
    }
}
