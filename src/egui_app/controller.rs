//! UI-thread owner of the folder tree, the bookmarks and running actions.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rfd::FileDialog;
use tracing::{info, warn};

use crate::actions::{
    ActionDialog, ActionEvent, ActionHandle, ActionId, ActionKind, ActionSummary, DialogOutcome,
    EventBridge, EventCode, EventKind, EventQueue, FileAction, event_channel,
};
use crate::bookmarks::{Bookmarks, CredentialKey, CredentialStore};
use crate::config::{self, AppSettings};
use crate::folder_browser::{FolderBrowser, FolderType, MenuCommand, NodeId};
use crate::vcs::{AuthContext, Revision, SvnCli, VcsClient, is_valid_url};

use super::state::{
    ActionPrompt, LoginPrompt, OutputKind, Prompt, RepoBookmarkPrompt, StatusTone, UiState,
};

struct RunningAction {
    handle: ActionHandle,
    origin: NodeId,
}

/// Maintains app state and bridges the browser core to the egui UI.
pub struct BrowserController {
    pub ui: UiState,
    browser: FolderBrowser,
    bridge: EventBridge,
    queue: EventQueue,
    running: HashMap<ActionId, RunningAction>,
    settings: AppSettings,
    settings_path: Option<PathBuf>,
    credentials: CredentialStore,
}

impl BrowserController {
    /// Build a controller around `client`. Settings are written to
    /// `settings_path` on every bookmark change when it is set.
    pub fn new(
        settings: AppSettings,
        client: Arc<dyn VcsClient>,
        credentials: CredentialStore,
        settings_path: Option<PathBuf>,
    ) -> Self {
        let bookmarks = Bookmarks::from_settings(&settings, |key| credentials.lookup(key));
        let (bridge, queue) = event_channel();
        let mut controller = Self {
            ui: UiState::default(),
            browser: FolderBrowser::new(bookmarks, client),
            bridge,
            queue,
            running: HashMap::new(),
            settings,
            settings_path,
            credentials,
        };
        let root = controller.browser.root();
        if let Err(err) = controller.browser.expand(root) {
            controller.report_error(format!("Failed to show bookmarks: {err}"));
        }
        controller
    }

    /// Load persisted settings and drive the configured `svn` binary.
    pub fn from_config() -> Result<Self, config::ConfigError> {
        let settings = config::load_or_default()?;
        let path = config::config_path()?;
        let client = Arc::new(SvnCli::new(settings.svn.binary.clone()));
        info!(svn = %settings.svn.binary.display(), "Using svn client");
        Ok(Self::new(
            settings,
            client,
            CredentialStore::new(),
            Some(path),
        ))
    }

    /// Call `waker` whenever a worker posts an event.
    pub fn set_repaint_waker(&mut self, waker: impl Fn() + Send + Sync + 'static) {
        self.bridge = self.bridge.clone().with_waker(waker);
    }

    pub fn browser(&self) -> &FolderBrowser {
        &self.browser
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    pub fn select(&mut self, id: NodeId) {
        self.browser.select(id);
    }

    pub fn toggle(&mut self, id: NodeId) {
        if let Err(err) = self.browser.toggle(id) {
            self.report_error(err.to_string());
        }
    }

    pub fn refresh(&mut self) {
        match self.browser.refresh() {
            Ok(()) => self.set_status("Refreshed", StatusTone::Info),
            Err(err) => self.report_error(err.to_string()),
        }
    }

    /// Run a context-menu command on `id`.
    ///
    /// Ignored while a prompt is open: prompts are modal.
    pub fn handle_menu(&mut self, id: NodeId, command: MenuCommand) {
        if self.refuse_while_prompting() {
            return;
        }
        self.browser.select(id);
        let Some(data) = self.browser.item(id).cloned() else {
            return;
        };
        match command {
            MenuCommand::AddWcBookmark => self.add_wc_bookmark_via_dialog(),
            MenuCommand::AddRepoBookmark => self.open_repo_bookmark_prompt(),
            MenuCommand::RemoveBookmark => self.remove_selected_bookmark(),
            MenuCommand::Login => self.open_login(&data.path),
            MenuCommand::Logout => self.logout(&data.path),
            _ => {
                if data.folder_type == FolderType::Bookmarks {
                    return;
                }
                if let Some(kind) = command.action_kind(&data.path) {
                    self.ui.prompt = Some(Prompt::Action(ActionPrompt::new(
                        kind,
                        vec![data.path.clone()],
                        id,
                    )));
                }
            }
        }
    }

    pub fn has_prompt(&self) -> bool {
        self.ui.prompt.is_some()
    }

    fn refuse_while_prompting(&mut self) -> bool {
        if !self.has_prompt() {
            return false;
        }
        self.set_status("Close the open dialog first", StatusTone::Warning);
        true
    }

    pub fn open_repo_bookmark_prompt(&mut self) {
        if self.refuse_while_prompting() {
            return;
        }
        self.ui.prompt = Some(Prompt::AddRepoBookmark(RepoBookmarkPrompt::default()));
    }

    pub fn add_wc_bookmark_via_dialog(&mut self) {
        let Some(path) = FileDialog::new().pick_folder() else {
            return;
        };
        self.add_bookmark(&path.to_string_lossy());
    }

    /// Add, show and select a bookmark, then persist.
    pub fn add_bookmark(&mut self, path: &str) -> bool {
        let path = path.trim();
        if !self.browser.add_bookmark(path) {
            self.set_status(format!("{path} is already bookmarked"), StatusTone::Warning);
            return false;
        }
        if let Err(err) = self.browser.refresh() {
            self.report_error(err.to_string());
        }
        self.browser.select_bookmark(path);
        self.persist();
        self.set_status(format!("Added bookmark {path}"), StatusTone::Info);
        true
    }

    pub fn remove_selected_bookmark(&mut self) {
        let Some(path) = self.browser.get_path().map(str::to_string) else {
            return;
        };
        if !self.browser.remove_bookmark() {
            return;
        }
        if let Err(err) = self.credentials.delete(&CredentialKey::Bookmark(path.clone())) {
            warn!("Failed to forget password: {err}");
        }
        self.persist();
        self.set_status(format!("Removed bookmark {path}"), StatusTone::Info);
    }

    fn open_login(&mut self, bookmark: &str) {
        let shared = !self.browser.auth_per_bookmark();
        let username = self
            .browser
            .bookmarks()
            .effective_context(bookmark)
            .map(|context| context.username.clone())
            .unwrap_or_default();
        self.ui.prompt = Some(Prompt::Login(LoginPrompt {
            bookmark: bookmark.to_string(),
            username,
            password: String::new(),
            shared,
        }));
    }

    /// Store a login for `bookmark`, or the shared login when auth is global.
    pub fn login(&mut self, bookmark: &str, username: &str, password: &str) {
        let username = username.trim();
        if username.is_empty() {
            self.logout(bookmark);
            return;
        }
        let context = AuthContext::new(username, (!password.is_empty()).then(|| password.to_string()));
        let key = if self.browser.auth_per_bookmark() {
            if !self.browser.bookmarks_mut().set_context(bookmark, context) {
                self.set_status(format!("{bookmark} is not bookmarked"), StatusTone::Warning);
                return;
            }
            CredentialKey::Bookmark(bookmark.to_string())
        } else {
            self.browser.bookmarks_mut().set_shared_context(Some(context));
            CredentialKey::Shared
        };
        if let Err(err) = self.credentials.set(&key, password) {
            warn!("Password kept for this session only: {err}");
        }
        self.persist();
        self.set_status(format!("Logged in as {username}"), StatusTone::Info);
    }

    pub fn logout(&mut self, bookmark: &str) {
        let key = if self.browser.auth_per_bookmark() {
            self.browser.bookmarks_mut().clear_context(bookmark);
            CredentialKey::Bookmark(bookmark.to_string())
        } else {
            self.browser.bookmarks_mut().set_shared_context(None);
            CredentialKey::Shared
        };
        if let Err(err) = self.credentials.delete(&key) {
            warn!("Failed to forget password: {err}");
        }
        self.persist();
        self.set_status("Logged out", StatusTone::Info);
    }

    pub fn set_auth_per_bookmark(&mut self, enabled: bool) {
        if self.browser.auth_per_bookmark() == enabled {
            return;
        }
        self.browser.set_auth_per_bookmark(enabled);
        self.persist();
    }

    /// Apply the open prompt. Prompts with invalid input stay open.
    pub fn confirm_prompt(&mut self) {
        let Some(prompt) = self.ui.prompt.take() else {
            return;
        };
        match prompt {
            Prompt::Action(prompt) => self.confirm_action_prompt(prompt),
            Prompt::Login(prompt) => self.login(&prompt.bookmark, &prompt.username, &prompt.password),
            Prompt::AddRepoBookmark(mut prompt) => {
                let url = prompt.url.trim().to_string();
                if !is_valid_url(&url) {
                    prompt.error = Some(format!("Not a repository URL: {url}"));
                    self.ui.prompt = Some(Prompt::AddRepoBookmark(prompt));
                    return;
                }
                self.add_bookmark(&url);
            }
        }
    }

    pub fn cancel_prompt(&mut self) {
        if let Some(Prompt::Action(prompt)) = self.ui.prompt.take() {
            self.set_status(format!("{} cancelled", prompt.kind.label()), StatusTone::Idle);
        }
    }

    fn confirm_action_prompt(&mut self, mut prompt: ActionPrompt) {
        if let Err(err) = apply_prompt_fields(&mut prompt) {
            prompt.error = Some(err);
            self.ui.prompt = Some(Prompt::Action(prompt));
            return;
        }
        if let Err(err) = self.start_action(
            prompt.origin,
            prompt.kind.clone(),
            prompt.targets.clone(),
            &mut DialogOutcome::Confirmed,
        ) {
            prompt.error = Some(err);
            self.ui.prompt = Some(Prompt::Action(prompt));
        }
    }

    /// Configure `kind` through `dialog` and start its worker.
    pub fn start_action(
        &mut self,
        origin: NodeId,
        kind: ActionKind,
        targets: Vec<String>,
        dialog: &mut dyn ActionDialog,
    ) -> Result<Option<ActionId>, String> {
        let context = self.browser.context_for(origin).cloned();
        let action = FileAction::new(
            kind,
            targets,
            self.bridge.clone(),
            Arc::clone(self.browser.client()),
        )
        .with_context(context);
        let label = action.kind().label();
        match action.perform_action(dialog) {
            Ok(Some(handle)) => {
                let id = handle.id();
                self.set_status(format!("{label} running..."), StatusTone::Busy);
                self.running.insert(id, RunningAction { handle, origin });
                Ok(Some(id))
            }
            Ok(None) => {
                self.set_status(format!("{label} cancelled"), StatusTone::Idle);
                Ok(None)
            }
            Err(err) => Err(err.to_string()),
        }
    }

    /// Drain worker events; call once per frame.
    ///
    /// A worker that exited without posting its terminal event is finished
    /// here, once everything it sent has been handled.
    pub fn poll_events(&mut self) {
        let exited: Vec<ActionId> = self
            .running
            .iter()
            .filter(|(_, running)| running.handle.is_finished())
            .map(|(id, _)| *id)
            .collect();
        for event in self.queue.drain() {
            self.handle_event(event);
        }
        for id in exited {
            if self.running.contains_key(&id) {
                self.finish_action(id, None);
            }
        }
    }

    fn handle_event(&mut self, event: ActionEvent) {
        match event.kind {
            EventKind::String {
                code: EventCode::Trace,
                text,
            } => self.ui.output.push(OutputKind::Trace, text),
            EventKind::String {
                code: EventCode::InternalError,
                text,
            } => self
                .ui
                .output
                .push(OutputKind::Error, format!("internal error: {text}")),
            EventKind::Data {
                code: EventCode::ActionEnd,
                payload,
            } => self.finish_action(event.action, payload),
            other => warn!(action = event.action, "Unexpected event {other:?}"),
        }
    }

    fn finish_action(&mut self, id: ActionId, payload: Option<ActionSummary>) {
        let Some(running) = self.running.remove(&id) else {
            return;
        };
        let label = running.handle.kind().label();
        let affects_tree = running.handle.kind().affects_tree();
        let deleted = matches!(running.handle.kind(), ActionKind::Delete { .. });
        let summary = match running.handle.join() {
            Ok(summary) => Some(summary),
            Err(err) => {
                warn!("{err}");
                payload
            }
        };
        match summary {
            Some(summary) if summary.is_success() => {
                self.set_status(summary.describe(), StatusTone::Info)
            }
            Some(summary) => self.set_status(summary.describe(), StatusTone::Warning),
            None => self.report_error(format!("{label} ended unexpectedly")),
        }
        if affects_tree {
            let target = if deleted {
                self.browser.parent(running.origin).unwrap_or(running.origin)
            } else {
                running.origin
            };
            if let Err(err) = self.browser.refresh_node(target) {
                self.report_error(err.to_string());
            }
        }
    }

    /// Persist bookmarks; called on every change and at shutdown.
    pub fn persist(&mut self) {
        self.browser.bookmarks().store_in(&mut self.settings);
        let Some(path) = self.settings_path.as_deref() else {
            return;
        };
        if let Err(err) = config::save_settings_to_path(&self.settings, path) {
            self.report_error(format!("Failed to save settings: {err}"));
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn shutdown(&mut self) {
        if !self.running.is_empty() {
            info!(count = self.running.len(), "Exiting with actions still running");
        }
        self.persist();
    }

    pub fn set_status(&mut self, text: impl Into<String>, tone: StatusTone) {
        self.ui.status.text = text.into();
        self.ui.status.tone = tone;
    }

    fn report_error(&mut self, message: String) {
        warn!("{message}");
        self.ui.output.push(OutputKind::Error, message.clone());
        self.set_status(message, StatusTone::Error);
    }
}

/// Copy the prompt's text fields into its action options.
fn apply_prompt_fields(prompt: &mut ActionPrompt) -> Result<(), String> {
    let first: Revision = prompt.revision.parse().map_err(|err| format!("{err}"))?;
    let second: Revision = prompt.revision2.parse().map_err(|err| format!("{err}"))?;
    match &mut prompt.kind {
        ActionKind::Export {
            destination,
            revision,
            ..
        } => {
            *destination = Path::new(prompt.destination.trim()).to_path_buf();
            *revision = first;
        }
        ActionKind::Update { revision, .. } => *revision = first,
        ActionKind::Merge {
            path1_rev,
            path2_rev,
            ..
        } => {
            *path1_rev = first;
            *path2_rev = second;
        }
        _ => {}
    }
    Ok(())
}
