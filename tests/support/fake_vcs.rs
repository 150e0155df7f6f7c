use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use svnbrowser::vcs::{
    ADM_DIR_NAME, AuthContext, DirEntry, MergeRequest, NodeKind, Revision, VcsClient, VcsError,
    join_child,
};

/// Repository double: listings are registered up front and every call is recorded.
#[derive(Default)]
pub struct FakeVcs {
    listings: Mutex<BTreeMap<String, Vec<DirEntry>>>,
    failing: Mutex<HashSet<String>>,
    unversioned: Mutex<HashSet<PathBuf>>,
    panicking: Mutex<HashSet<String>>,
    calls: Mutex<Vec<(String, String, Option<String>)>>,
}

impl FakeVcs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dirs(self, url: &str, dirs: &[&str]) -> Self {
        self.set_dirs(url, dirs);
        self
    }

    pub fn set_dirs(&self, url: &str, dirs: &[&str]) {
        let entries = dirs
            .iter()
            .map(|name| DirEntry {
                name: name.to_string(),
                path: join_child(url, name),
                kind: NodeKind::Dir,
            })
            .collect();
        self.listings
            .lock()
            .unwrap()
            .insert(url.to_string(), entries);
    }

    /// Report `path` as unversioned in its parent's status.
    pub fn with_unversioned(self, path: impl Into<PathBuf>) -> Self {
        self.unversioned.lock().unwrap().insert(path.into());
        self
    }

    /// Calls on `target` panic, taking the worker thread down.
    pub fn panic_on(self, target: &str) -> Self {
        self.panicking.lock().unwrap().insert(target.to_string());
        self
    }

    pub fn fail_on(self, target: &str) -> Self {
        self.failing.lock().unwrap().insert(target.to_string());
        self
    }

    /// `(operation, target, username)` per call, in call order.
    pub fn calls(&self) -> Vec<(String, String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str, target: &str, auth: Option<&AuthContext>) -> Result<String, VcsError> {
        self.calls.lock().unwrap().push((
            op.to_string(),
            target.to_string(),
            auth.map(|auth| auth.username.clone()),
        ));
        if self.panicking.lock().unwrap().contains(target) {
            panic!("client crashed on {target}");
        }
        if self.failing.lock().unwrap().contains(target) {
            return Err(VcsError::CommandFailed {
                command: format!("svn {op}"),
                message: format!("svn: E155007: '{target}' is not a working copy"),
            });
        }
        Ok(format!("{op} {target}\nAt revision 42."))
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
                command: "svn list".into(),
                message: format!("svn: E170000: URL '{url}' doesn't exist"),
            })
    }

    fn export(
        &self,
        source: &str,
        _destination: &Path,
        _revision: &Revision,
        _force: bool,
        auth: Option<&AuthContext>,
    ) -> Result<String, VcsError> {
        self.record("export", source, auth)
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
