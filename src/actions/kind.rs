use std::path::PathBuf;

use crate::vcs::{AuthContext, MergeRequest, Revision, VcsClient, VcsError, join_child, leaf_name};

use super::ActionError;

/// Operation descriptor: which client call to make and with what options.
///
/// Dialogs edit the options in place before the worker starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Delete {
        force: bool,
    },
    /// Create `name` below each target.
    Mkdir {
        name: String,
        message: String,
    },
    /// Export each target to `destination/<leaf name>`.
    Export {
        destination: PathBuf,
        revision: Revision,
        force: bool,
    },
    Update {
        revision: Revision,
        recursive: bool,
    },
    Commit {
        message: String,
        recursive: bool,
    },
    /// Merge the difference `path1@path1_rev .. path2@path2_rev` into each target.
    Merge {
        path1: String,
        path1_rev: Revision,
        path2: String,
        path2_rev: Revision,
        recursive: bool,
        force: bool,
        username: String,
        password: String,
    },
    Unlock {
        force: bool,
    },
}

impl ActionKind {
    pub fn delete() -> Self {
        ActionKind::Delete { force: false }
    }

    pub fn mkdir() -> Self {
        ActionKind::Mkdir {
            name: String::new(),
            message: String::new(),
        }
    }

    pub fn export() -> Self {
        ActionKind::Export {
            destination: PathBuf::new(),
            revision: Revision::Head,
            force: false,
        }
    }

    pub fn update() -> Self {
        ActionKind::Update {
            revision: Revision::Head,
            recursive: true,
        }
    }

    pub fn commit() -> Self {
        ActionKind::Commit {
            message: String::new(),
            recursive: true,
        }
    }

    /// Merge whose sources default to the merge destination.
    pub fn merge(source: &str) -> Self {
        ActionKind::Merge {
            path1: source.to_string(),
            path1_rev: Revision::Head,
            path2: source.to_string(),
            path2_rev: Revision::Head,
            recursive: true,
            force: false,
            username: String::new(),
            password: String::new(),
        }
    }

    pub fn unlock() -> Self {
        ActionKind::Unlock { force: false }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Delete { .. } => "Delete",
            ActionKind::Mkdir { .. } => "Mkdir",
            ActionKind::Export { .. } => "Export",
            ActionKind::Update { .. } => "Update",
            ActionKind::Commit { .. } => "Commit",
            ActionKind::Merge { .. } => "Merge",
            ActionKind::Unlock { .. } => "Unlock",
        }
    }

    /// Whether a finished run should refresh the node it was launched from.
    pub fn affects_tree(&self) -> bool {
        matches!(
            self,
            ActionKind::Delete { .. }
                | ActionKind::Mkdir { .. }
                | ActionKind::Update { .. }
                | ActionKind::Merge { .. }
        )
    }

    /// Reject option sets the client would refuse for every target.
    pub fn validate(&self, targets: &[String]) -> Result<(), ActionError> {
        if targets.is_empty() {
            return Err(ActionError::InvalidOptions(format!(
                "{} needs at least one target",
                self.label()
            )));
        }
        let problem = match self {
            ActionKind::Mkdir { name, .. } if name.trim().is_empty() => {
                Some("folder name is empty")
            }
            ActionKind::Mkdir { name, .. } if name.contains(['/', '\\']) => {
                Some("folder name must not contain separators")
            }
            ActionKind::Commit { message, .. } if message.trim().is_empty() => {
                Some("log message is empty")
            }
            ActionKind::Export { destination, .. } if destination.as_os_str().is_empty() => {
                Some("destination is empty")
            }
            ActionKind::Merge { path1, path2, .. }
                if path1.trim().is_empty() || path2.trim().is_empty() =>
            {
                Some("both merge sources are required")
            }
            _ => None,
        };
        match problem {
            Some(problem) => Err(ActionError::InvalidOptions(format!(
                "{}: {problem}",
                self.label()
            ))),
            None => Ok(()),
        }
    }

    /// Run the operation on a single target.
    pub fn execute_one(
        &self,
        client: &dyn VcsClient,
        target: &str,
        auth: Option<&AuthContext>,
    ) -> Result<String, VcsError> {
        match self {
            ActionKind::Delete { force } => client.remove(target, *force, auth),
            ActionKind::Mkdir { name, message } => {
                client.mkdir(&join_child(target, name.trim()), message, auth)
            }
            ActionKind::Export {
                destination,
                revision,
                force,
            } => client.export(
                target,
                &destination.join(leaf_name(target)),
                revision,
                *force,
                auth,
            ),
            ActionKind::Update {
                revision,
                recursive,
            } => client.update(target, revision, *recursive, auth),
            ActionKind::Commit { message, recursive } => {
                client.commit(target, message, *recursive, auth)
            }
            ActionKind::Merge {
                path1,
                path1_rev,
                path2,
                path2_rev,
                recursive,
                force,
                username,
                password,
            } => {
                let request = MergeRequest {
                    path1: path1.trim().to_string(),
                    revision1: *path1_rev,
                    path2: path2.trim().to_string(),
                    revision2: *path2_rev,
                    destination: target.to_string(),
                    recursive: *recursive,
                    force: *force,
                };
                let login = (!username.trim().is_empty()).then(|| {
                    AuthContext::new(
                        username.trim(),
                        (!password.is_empty()).then(|| password.clone()),
                    )
                });
                client.merge(&request, login.as_ref().or(auth))
            }
            ActionKind::Unlock { force } => client.unlock(target, *force, auth),
        }
    }
}
