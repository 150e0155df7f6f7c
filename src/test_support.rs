//! Scripted in-memory [`VcsClient`] for unit tests.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::vcs::{
    ADM_DIR_NAME, AuthContext, DirEntry, MergeRequest, NodeKind, Revision, VcsClient, VcsError,
    join_child,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Call {
    pub(crate) op: &'static str,
    pub(crate) target: String,
    pub(crate) username: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct FakeVcs {
    listings: Mutex<BTreeMap<String, Vec<DirEntry>>>,
    failing: Mutex<HashSet<String>>,
    unversioned: Mutex<HashSet<PathBuf>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeVcs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register the listing of `url`; `dirs` and `files` are leaf names.
    pub(crate) fn with_listing(self, url: &str, dirs: &[&str], files: &[&str]) -> Self {
        let mut entries: Vec<DirEntry> = files
            .iter()
            .map(|name| entry(url, name, NodeKind::File))
            .collect();
        entries.extend(dirs.iter().map(|name| entry(url, name, NodeKind::Dir)));
        self.listings
            .lock()
            .unwrap()
            .insert(url.to_string(), entries);
        self
    }

    /// Report `path` as unversioned in its parent's status.
    pub(crate) fn with_unversioned(self, path: impl Into<PathBuf>) -> Self {
        self.unversioned.lock().unwrap().insert(path.into());
        self
    }

    pub(crate) fn fail_on(self, target: &str) -> Self {
        self.failing.lock().unwrap().insert(target.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(
        &self,
        op: &'static str,
        target: &str,
        auth: Option<&AuthContext>,
    ) -> Result<String, VcsError> {
        self.calls.lock().unwrap().push(Call {
            op,
            target: target.to_string(),
            username: auth.map(|auth| auth.username.clone()),
        });
        if self.failing.lock().unwrap().contains(target) {
            return Err(VcsError::CommandFailed {
                command: format!("svn {op} {target}"),
                message: format!("svn: E160013: '{target}' not found"),
            });
        }
        Ok(format!("{op} {target}"))
    }
}

fn entry(parent: &str, name: &str, kind: NodeKind) -> DirEntry {
    DirEntry {
        name: name.to_string(),
        path: join_child(parent, name),
        kind,
    }
}

impl VcsClient for FakeVcs {
    fn remove(&self, target: &str, _force: bool, auth: Option<&AuthContext>) -> Result<String, VcsError> {
        self.record("remove", target, auth)
    }

    fn mkdir(&self, target: &str, _message: &str, auth: Option<&AuthContext>) -> Result<String, VcsError> {
        self.record("mkdir", target, auth)
    }

    fn list(
        &self,
        url: &str,
        _revision: &Revision,
        auth: Option<&AuthContext>,
    ) -> Result<Vec<DirEntry>, VcsError> {
        self.record("list", url, auth)?;
        self.listings
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| VcsError::CommandFailed {
                command: format!("svn list {url}"),
                message: format!("svn: E170000: URL '{url}' doesn't exist"),
            })
    }

    fn export(
        &self,
        source: &str,
        destination: &Path,
        _revision: &Revision,
        _force: bool,
        auth: Option<&AuthContext>,
    ) -> Result<String, VcsError> {
        self.record("export", source, auth)?;
        Ok(format!("Exported {}", destination.display()))
    }

    fn update(
        &self,
        path: &str,
        _revision: &Revision,
        _recursive: bool,
        auth: Option<&AuthContext>,
    ) -> Result<String, VcsError> {
        self.record("update", path, auth)
    }

    fn commit(
        &self,
        path: &str,
        _message: &str,
        _recursive: bool,
        auth: Option<&AuthContext>,
    ) -> Result<String, VcsError> {
        self.record("commit", path, auth)
    }

    fn merge(&self, request: &MergeRequest, auth: Option<&AuthContext>) -> Result<String, VcsError> {
        self.record("merge", &request.destination, auth)
    }

    fn unlock(&self, target: &str, _force: bool, auth: Option<&AuthContext>) -> Result<String, VcsError> {
        self.record("unlock", target, auth)
    }

    fn is_working_copy(&self, path: &Path) -> bool {
        path.ancestors().any(|dir| dir.join(ADM_DIR_NAME).is_dir())
    }

    fn unversioned_entries(&self, dir: &Path) -> Result<HashSet<String>, VcsError> {
        Ok(self
            .unversioned
            .lock()
            .unwrap()
            .iter()
            .filter(|path| path.parent() == Some(dir))
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect())
    }
}
