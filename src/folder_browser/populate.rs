use std::path::Path;

use tracing::{debug, warn};

use crate::vcs::{ADM_DIR_NAME, AuthContext, NodeKind, Revision, VcsClient};

use super::BrowseError;
use super::item::{FolderIcon, FolderItemData, FolderType};

/// A child about to be inserted under an expanding node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingChild {
    pub(crate) data: FolderItemData,
    pub(crate) icon: FolderIcon,
    pub(crate) expandable: bool,
}

/// Immediate subdirectories of a local folder, skipping the administrative directory.
///
/// Inside a working copy each child is classified from one status call on
/// `parent`; a child holding its own administrative directory is a checkout.
pub(crate) fn scan_local(client: &dyn VcsClient, parent: &Path) -> Result<Vec<PendingChild>, BrowseError> {
    let read_error = |source| BrowseError::ReadDir {
        path: parent.to_path_buf(),
        source,
    };
    let unversioned = if client.is_working_copy(parent) {
        match client.unversioned_entries(parent) {
            Ok(names) => Some(names),
            Err(err) => {
                warn!("Status of {} unavailable: {err}", parent.display());
                None
            }
        }
    } else {
        None
    };
    let mut children = Vec::new();
    for entry in std::fs::read_dir(parent).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        if name == ADM_DIR_NAME || !path.is_dir() {
            continue;
        }
        let versioned = path.join(ADM_DIR_NAME).is_dir()
            || match &unversioned {
                Some(names) => !names.contains(&name),
                None => client.is_working_copy(&path),
            };
        let icon = if versioned {
            FolderIcon::Folder
        } else {
            FolderIcon::NonVersionedFolder
        };
        children.push(PendingChild {
            expandable: has_subdirectories(&path),
            data: FolderItemData::new(FolderType::Normal, path.to_string_lossy(), name),
            icon,
        });
    }
    debug!(count = children.len(), "Scanned {}", parent.display());
    Ok(children)
}

/// Directory entries of a repository URL at HEAD; files are dropped.
pub(crate) fn scan_repository(
    client: &dyn VcsClient,
    url: &str,
    auth: Option<&AuthContext>,
) -> Result<Vec<PendingChild>, BrowseError> {
    let entries = client
        .list(url, &Revision::Head, auth)
        .map_err(|source| BrowseError::Listing {
            url: url.to_string(),
            source,
        })?;
    let children: Vec<PendingChild> = entries
        .into_iter()
        .filter(|entry| entry.kind == NodeKind::Dir)
        .map(|entry| PendingChild {
            data: FolderItemData::new(FolderType::Normal, entry.path, entry.name),
            icon: FolderIcon::Repository,
            expandable: true,
        })
        .collect();
    debug!(count = children.len(), "Listed {url}");
    Ok(children)
}

/// True when `path` has at least one subdirectory other than the administrative one.
pub(crate) fn has_subdirectories(path: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(path) else {
        return false;
    };
    entries
        .filter_map(|entry| entry.ok())
        .any(|entry| entry.file_name() != ADM_DIR_NAME && entry.path().is_dir())
}
