//! [`VcsClient`] backed by the `svn` command-line client.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use super::{
    ADM_DIR_NAME, AuthContext, DirEntry, MergeRequest, NodeKind, Revision, VcsClient, VcsError,
    auto_decode, is_valid_url, join_child, leaf_name,
};

const PASSWORD_FLAG: &str = "--password";

/// Runs the configured `svn` binary, one process per call.
#[derive(Debug, Clone)]
pub struct SvnCli {
    program: PathBuf,
}

impl Default for SvnCli {
    fn default() -> Self {
        Self::new("svn")
    }
}

/// Argument list of one invocation, kept separately so it can be logged
/// without leaking the password.
struct Invocation {
    args: Vec<OsString>,
}

impl Invocation {
    fn new(subcommand: &str, auth: Option<&AuthContext>) -> Self {
        let mut invocation = Self { args: Vec::new() };
        invocation.arg(subcommand).arg("--non-interactive");
        if let Some(auth) = auth.filter(|auth| auth.has_username()) {
            invocation.arg("--username").arg(&auth.username);
            if let Some(password) = auth.password.as_deref() {
                invocation.arg(PASSWORD_FLAG).arg(password);
            }
        }
        invocation
    }

    fn arg(&mut self, arg: impl Into<OsString>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    fn flag(&mut self, enabled: bool, flag: &str) -> &mut Self {
        if enabled {
            self.arg(flag);
        }
        self
    }

    fn redacted(&self, program: &Path) -> String {
        let mut parts = vec![program.display().to_string()];
        let mut hide_next = false;
        for arg in &self.args {
            if hide_next {
                parts.push("***".to_string());
                hide_next = false;
                continue;
            }
            let text = arg.to_string_lossy();
            hide_next = text == PASSWORD_FLAG;
            parts.push(text.into_owned());
        }
        parts.join(" ")
    }
}

impl SvnCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn run(&self, invocation: &Invocation) -> Result<String, VcsError> {
        let shown = invocation.redacted(&self.program);
        debug!(command = %shown, "Running svn");
        let output = Command::new(&self.program)
            .args(&invocation.args)
            .output()
            .map_err(|source| VcsError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(VcsError::CommandFailed {
                message: failure_message(&output.stderr, output.status.code()),
                command: shown,
            });
        }
        auto_decode(&output.stdout)
    }
}

fn failure_message(stderr: &[u8], code: Option<i32>) -> String {
    let text = auto_decode(stderr).unwrap_or_else(|_| String::from_utf8_lossy(stderr).into_owned());
    let errors: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("svn: E"))
        .collect();
    if !errors.is_empty() {
        return errors.join("\n");
    }
    if !text.trim().is_empty() {
        return text.trim().to_string();
    }
    match code {
        Some(code) => format!("svn exited with status {code}"),
        None => "svn was terminated by a signal".to_string(),
    }
}

fn depth(recursive: bool) -> &'static str {
    if recursive { "infinity" } else { "files" }
}

/// Parse `svn list --xml` output for the directory at `parent`.
pub(crate) fn parse_list_xml(xml: &str, parent: &str) -> Result<Vec<DirEntry>, VcsError> {
    if xml.trim().is_empty() {
        return Ok(Vec::new());
    }
    let doc = roxmltree::Document::parse(xml)?;
    let entries = doc
        .descendants()
        .filter(|node| node.has_tag_name("entry"))
        .filter_map(|entry| {
            let name = entry
                .children()
                .find(|child| child.has_tag_name("name"))
                .and_then(|child| child.text())?
                .to_string();
            let kind = match entry.attribute("kind") {
                Some("dir") => NodeKind::Dir,
                Some("file") => NodeKind::File,
                _ => NodeKind::Unknown,
            };
            Some(DirEntry {
                path: join_child(parent, &name),
                name,
                kind,
            })
        })
        .collect();
    Ok(entries)
}

/// Leaf names of `svn status --xml` entries that are unversioned or ignored.
pub(crate) fn parse_status_xml(xml: &str, dir: &Path) -> Result<HashSet<String>, VcsError> {
    if xml.trim().is_empty() {
        return Ok(HashSet::new());
    }
    let doc = roxmltree::Document::parse(xml)?;
    let names = doc
        .descendants()
        .filter(|node| node.has_tag_name("entry"))
        .filter(|entry| {
            entry
                .children()
                .find(|child| child.has_tag_name("wc-status"))
                .and_then(|status| status.attribute("item"))
                .is_some_and(|item| matches!(item, "unversioned" | "ignored"))
        })
        .filter_map(|entry| entry.attribute("path"))
        .filter(|path| Path::new(path) != dir)
        .map(|path| leaf_name(path).to_string())
        .collect();
    Ok(names)
}

impl VcsClient for SvnCli {
    fn remove(
        &self,
        target: &str,
        force: bool,
        auth: Option<&AuthContext>,
    ) -> Result<String, VcsError> {
        let mut invocation = Invocation::new("delete", auth);
        invocation.flag(force, "--force");
        if is_valid_url(target) {
            invocation.arg("-m").arg(format!("Delete {}", leaf_name(target)));
        }
        invocation.arg(target);
        self.run(&invocation)
    }

    fn mkdir(
        &self,
        target: &str,
        message: &str,
        auth: Option<&AuthContext>,
    ) -> Result<String, VcsError> {
        let mut invocation = Invocation::new("mkdir", auth);
        // local mkdir is not a commit and rejects a log message
        if is_valid_url(target) {
            invocation.arg("-m").arg(message);
        }
        invocation.arg(target);
        self.run(&invocation)
    }

    fn list(
        &self,
        url: &str,
        revision: &Revision,
        auth: Option<&AuthContext>,
    ) -> Result<Vec<DirEntry>, VcsError> {
        let mut invocation = Invocation::new("list", auth);
        invocation
            .arg("--xml")
            .arg("-r")
            .arg(revision.as_arg())
            .arg(url);
        let xml = self.run(&invocation)?;
        parse_list_xml(&xml, url)
    }

    fn export(
        &self,
        source: &str,
        destination: &Path,
        revision: &Revision,
        force: bool,
        auth: Option<&AuthContext>,
    ) -> Result<String, VcsError> {
        let mut invocation = Invocation::new("export", auth);
        invocation
            .flag(force, "--force")
            .arg("-r")
            .arg(revision.as_arg())
            .arg(source)
            .arg(destination.as_os_str());
        self.run(&invocation)
    }

    fn update(
        &self,
        path: &str,
        revision: &Revision,
        recursive: bool,
        auth: Option<&AuthContext>,
    ) -> Result<String, VcsError> {
        let mut invocation = Invocation::new("update", auth);
        invocation
            .arg("-r")
            .arg(revision.as_arg())
            .arg("--depth")
            .arg(depth(recursive))
            .arg(path);
        self.run(&invocation)
    }

    fn commit(
        &self,
        path: &str,
        message: &str,
        recursive: bool,
        auth: Option<&AuthContext>,
    ) -> Result<String, VcsError> {
        let mut invocation = Invocation::new("commit", auth);
        invocation
            .arg("-m")
            .arg(message)
            .arg("--depth")
            .arg(depth(recursive))
            .arg(path);
        self.run(&invocation)
    }

    fn merge(
        &self,
        request: &MergeRequest,
        auth: Option<&AuthContext>,
    ) -> Result<String, VcsError> {
        let mut invocation = Invocation::new("merge", auth);
        invocation
            .flag(request.force, "--force")
            .arg("--depth")
            .arg(depth(request.recursive))
            .arg(format!("{}@{}", request.path1, request.revision1.as_arg()))
            .arg(format!("{}@{}", request.path2, request.revision2.as_arg()))
            .arg(&request.destination);
        self.run(&invocation)
    }

    fn unlock(
        &self,
        target: &str,
        force: bool,
        auth: Option<&AuthContext>,
    ) -> Result<String, VcsError> {
        let mut invocation = Invocation::new("unlock", auth);
        invocation.flag(force, "--force").arg(target);
        self.run(&invocation)
    }

    fn is_working_copy(&self, path: &Path) -> bool {
        path.ancestors().any(|dir| dir.join(ADM_DIR_NAME).is_dir())
    }

    fn unversioned_entries(&self, dir: &Path) -> Result<HashSet<String>, VcsError> {
        let mut invocation = Invocation::new("status", None);
        invocation
            .arg("--xml")
            .arg("--depth")
            .arg("immediates")
            .arg("--no-ignore")
            .arg(dir.as_os_str());
        let xml = self.run(&invocation)?;
        parse_status_xml(&xml, dir)
    }
}
