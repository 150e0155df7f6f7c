//! Version-control client contract consumed by the browser and the actions.
//!
//! Everything above this module talks to Subversion through [`VcsClient`];
//! [`SvnCli`] is the production implementation backed by the `svn` binary.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

mod decode;
mod error;
mod revision;
mod svn_cli;


pub use decode::auto_decode;
pub use error::VcsError;
pub use revision::Revision;
pub use svn_cli::SvnCli;

/// Name of the per-directory administrative folder, never shown in the tree.
pub const ADM_DIR_NAME: &str = ".svn";

const URL_SCHEMES: &[&str] = &["http", "https", "svn", "file"];

/// Kind of a repository entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Dir,
    Unknown,
}

/// One entry of a repository directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Leaf name, used as the display label.
    pub name: String,
    /// Full URL of the entry.
    pub path: String,
    pub kind: NodeKind,
}

/// Credentials handed to the client for a single call.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct AuthContext {
    pub username: String,
    pub password: Option<String>,
}

impl AuthContext {
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    pub fn has_username(&self) -> bool {
        !self.username.trim().is_empty()
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Arguments of a two-source merge into a working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    pub path1: String,
    pub revision1: Revision,
    pub path2: String,
    pub revision2: Revision,
    pub destination: String,
    pub recursive: bool,
    pub force: bool,
}

/// Operations the browser needs from a version-control client.
///
/// Mutating calls return the notification text produced by the client, one
/// notification per line. Implementations must be callable from any thread.
pub trait VcsClient: Send + Sync {
    fn remove(&self, target: &str, force: bool, auth: Option<&AuthContext>)
    -> Result<String, VcsError>;

    fn mkdir(&self, target: &str, message: &str, auth: Option<&AuthContext>)
    -> Result<String, VcsError>;

    /// Immediate children of `url` at `revision`.
    fn list(
        &self,
        url: &str,
        revision: &Revision,
        auth: Option<&AuthContext>,
    ) -> Result<Vec<DirEntry>, VcsError>;

    fn export(
        &self,
        source: &str,
        destination: &Path,
        revision: &Revision,
        force: bool,
        auth: Option<&AuthContext>,
    ) -> Result<String, VcsError>;

    fn update(
        &self,
        path: &str,
        revision: &Revision,
        recursive: bool,
        auth: Option<&AuthContext>,
    ) -> Result<String, VcsError>;

    fn commit(
        &self,
        path: &str,
        message: &str,
        recursive: bool,
        auth: Option<&AuthContext>,
    ) -> Result<String, VcsError>;

    fn merge(&self, request: &MergeRequest, auth: Option<&AuthContext>)
    -> Result<String, VcsError>;

    fn unlock(&self, target: &str, force: bool, auth: Option<&AuthContext>)
    -> Result<String, VcsError>;

    /// Whether `path` lies inside a working copy.
    fn is_working_copy(&self, path: &Path) -> bool;

    /// Leaf names of the immediate children of working-copy directory `dir`
    /// that are unversioned or ignored.
    fn unversioned_entries(&self, dir: &Path) -> Result<HashSet<String>, VcsError>;
}

/// Returns true when `candidate` is a repository URL rather than a local path.
///
/// Windows drive paths such as `C:\work` parse as URLs with a one-letter
/// scheme, so only known repository schemes are accepted.
pub fn is_valid_url(candidate: &str) -> bool {
    let Ok(parsed) = url::Url::parse(candidate) else {
        return false;
    };
    let scheme = parsed.scheme();
    let known = URL_SCHEMES.contains(&scheme) || scheme.starts_with("svn+");
    known
        && candidate
            .get(scheme.len()..)
            .is_some_and(|rest| rest.starts_with("://"))
}

/// Last path segment of a local path or URL, ignoring trailing separators.
pub fn leaf_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    trimmed
        .rsplit(['/', '\\'])
        .next()
        .filter(|leaf| !leaf.is_empty())
        .unwrap_or(trimmed)
}

/// Join a child name onto a local path or URL.
pub fn join_child(parent: &str, name: &str) -> String {
    if is_valid_url(parent) {
        format!(
            "{}/{}",
            parent.trim_end_matches('/'),
            urlencoding::encode(name)
        )
    } else {
        Path::new(parent).join(name).to_string_lossy().into_owned()
    }
}
