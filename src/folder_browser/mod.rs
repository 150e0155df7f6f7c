//! Lazily populated tree of bookmarks and their folders.
//!
//! The root is a synthetic "Bookmarks" node whose children are the bookmark
//! roots. Every other node is filled on expand, from the filesystem or from a
//! repository listing, and emptied again on collapse: children exist only
//! while their parent is expanded, so each expand re-reads the backing store.
//! The tree is owned by the UI thread.

mod arena;
mod beautify;
mod item;
mod menu;
mod populate;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::bookmarks::Bookmarks;
use crate::vcs::{AuthContext, VcsClient, VcsError, is_valid_url};

pub use arena::{NodeId, Tree};
pub use beautify::{MAX_LABEL_LEN, beautify_path};
pub use item::{FolderIcon, FolderItemData, FolderNode, FolderType, NodeState};
pub use menu::{MenuCommand, MenuEntry};

use populate::PendingChild;

#[derive(Debug, thiserror::Error)]
pub enum BrowseError {
    #[error("Failed to read folder {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to list {url}: {source}")]
    Listing { url: String, source: VcsError },
    #[error("Folder node no longer exists")]
    UnknownNode,
}

pub struct FolderBrowser {
    tree: Tree<FolderNode>,
    root: NodeId,
    bookmarks: Bookmarks,
    client: Arc<dyn VcsClient>,
    selection: Option<NodeId>,
}

impl FolderBrowser {
    /// Browser with a collapsed root; expand [`root`](Self::root) to show bookmarks.
    pub fn new(bookmarks: Bookmarks, client: Arc<dyn VcsClient>) -> Self {
        let mut tree = Tree::new();
        let root = tree.insert_root(FolderNode::new(
            FolderItemData::root(),
            FolderIcon::Computer,
            true,
        ));
        Self {
            tree,
            root,
            bookmarks,
            client,
            selection: None,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&FolderNode> {
        self.tree.get(id)
    }

    pub fn item(&self, id: NodeId) -> Option<&FolderItemData> {
        self.tree.get(id).map(FolderNode::data)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.tree.children(id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.parent(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.tree.contains(id)
    }

    /// Number of live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.tree.len()
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(FolderNode::is_expanded)
    }

    /// Populate `id` and return its child count.
    ///
    /// On error the node stays collapsed and keeps its expander.
    pub fn expand(&mut self, id: NodeId) -> Result<usize, BrowseError> {
        let node = self.tree.get(id).ok_or(BrowseError::UnknownNode)?;
        if node.state() != NodeState::Collapsed {
            return Ok(self.tree.children(id).len());
        }
        let data = node.data().clone();
        self.set_state(id, NodeState::Expanding);

        let pending = match data.folder_type {
            FolderType::Bookmarks => Ok(self.bookmark_children()),
            FolderType::Bookmark | FolderType::Normal if is_valid_url(&data.path) => {
                let auth = self.context_for(id).cloned();
                populate::scan_repository(self.client.as_ref(), &data.path, auth.as_ref())
            }
            FolderType::Bookmark | FolderType::Normal => {
                populate::scan_local(self.client.as_ref(), Path::new(&data.path))
            }
        };
        let pending = match pending {
            Ok(pending) => pending,
            Err(err) => {
                warn!("Expanding {} failed: {err}", data.label);
                self.set_state(id, NodeState::Collapsed);
                return Err(err);
            }
        };

        let count = pending.len();
        for child in pending {
            self.tree
                .append(id, FolderNode::new(child.data, child.icon, child.expandable));
        }
        self.tree.sort_children_by(id, |a, b| {
            let (a, b) = (&a.data().label, &b.data().label);
            a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
        });
        if let Some(node) = self.tree.get_mut(id) {
            node.set_state(NodeState::Expanded);
            node.set_expandable(count > 0);
        }
        debug!(count, "Expanded {}", data.label);
        Ok(count)
    }

    /// Drop every descendant of `id` and restore its expander.
    ///
    /// A selection inside the dropped subtree moves to `id`.
    pub fn collapse(&mut self, id: NodeId) -> bool {
        if !self.is_expanded(id) {
            return false;
        }
        self.set_state(id, NodeState::Collapsing);
        if let Some(selected) = self.selection
            && selected != id
            && self.tree.ancestors(selected).any(|ancestor| ancestor == id)
        {
            self.selection = Some(id);
        }
        let freed = self.tree.clear_children(id);
        if let Some(node) = self.tree.get_mut(id) {
            node.set_state(NodeState::Collapsed);
            node.set_expandable(true);
        }
        debug!(freed, "Collapsed node");
        true
    }

    /// Collapse an expanded node or expand a collapsed one.
    pub fn toggle(&mut self, id: NodeId) -> Result<(), BrowseError> {
        if self.is_expanded(id) {
            self.collapse(id);
            Ok(())
        } else {
            self.expand(id).map(|_| ())
        }
    }

    /// Rebuild the whole tree from the bookmark list.
    pub fn refresh(&mut self) -> Result<(), BrowseError> {
        self.collapse(self.root);
        self.expand(self.root).map(|_| ())
    }

    /// Re-read `id` if it is still alive and expanded.
    pub fn refresh_node(&mut self, id: NodeId) -> Result<(), BrowseError> {
        if !self.collapse(id) {
            return Ok(());
        }
        self.expand(id).map(|_| ())
    }

    pub fn select(&mut self, id: NodeId) -> bool {
        if !self.tree.contains(id) {
            return false;
        }
        self.selection = Some(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Selected node, if it is still alive.
    pub fn selection(&self) -> Option<NodeId> {
        self.selection.filter(|id| self.tree.contains(*id))
    }

    pub fn get_selection(&self) -> Option<&FolderItemData> {
        self.selection().and_then(|id| self.item(id))
    }

    /// Path of the selected node.
    pub fn get_path(&self) -> Option<&str> {
        self.get_selection().map(|data| data.path.as_str())
    }

    /// Login used for calls below the selected node.
    pub fn get_context(&self) -> Option<&AuthContext> {
        self.selection().and_then(|id| self.context_for(id))
    }

    /// Walk up from `id` to its bookmark and return that bookmark's login.
    pub fn context_for(&self, id: NodeId) -> Option<&AuthContext> {
        let bookmark = self.bookmark_of(id)?;
        let path = &self.item(bookmark)?.path;
        self.bookmarks.effective_context(path)
    }

    /// Bookmark node at or above `id`.
    pub fn bookmark_of(&self, id: NodeId) -> Option<NodeId> {
        self.tree.ancestors(id).find(|ancestor| {
            self.item(*ancestor)
                .is_some_and(|data| data.folder_type == FolderType::Bookmark)
        })
    }

    /// Select the child of the current selection whose path is `path`,
    /// expanding the selection first if needed.
    pub fn select_folder(&mut self, path: &str) -> bool {
        let Some(parent) = self.selection() else {
            return false;
        };
        if !self.item(parent).is_some_and(|data| data.is_real) {
            return false;
        }
        if !self.is_expanded(parent)
            && let Err(err) = self.expand(parent)
        {
            warn!("Cannot search {path}: {err}");
            return false;
        }
        match self.find_child(parent, path) {
            Some(id) => {
                self.selection = Some(id);
                true
            }
            None => false,
        }
    }

    /// Select the bookmark whose path is `path` among the root's children.
    pub fn select_bookmark(&mut self, path: &str) -> bool {
        match self.find_child(self.root, path) {
            Some(id) => {
                self.selection = Some(id);
                true
            }
            None => false,
        }
    }

    /// Append a bookmark to the collection; call [`refresh`](Self::refresh) to show it.
    pub fn add_bookmark(&mut self, path: &str) -> bool {
        self.bookmarks.add(path)
    }

    /// Remove the selected bookmark from the tree and the collection.
    pub fn remove_bookmark(&mut self) -> bool {
        let Some(id) = self.selection() else {
            return false;
        };
        let Some(data) = self
            .item(id)
            .filter(|data| data.folder_type == FolderType::Bookmark)
        else {
            return false;
        };
        let path = data.path.clone();
        self.tree.remove_subtree(id);
        self.selection = None;
        self.bookmarks.remove(&path)
    }

    pub fn bookmarks(&self) -> &Bookmarks {
        &self.bookmarks
    }

    pub fn bookmarks_mut(&mut self) -> &mut Bookmarks {
        &mut self.bookmarks
    }

    pub fn auth_per_bookmark(&self) -> bool {
        self.bookmarks.auth_per_bookmark()
    }

    pub fn set_auth_per_bookmark(&mut self, enabled: bool) {
        self.bookmarks.set_auth_per_bookmark(enabled);
    }

    pub fn client(&self) -> &Arc<dyn VcsClient> {
        &self.client
    }

    /// Menu shown when right-clicking `id`.
    pub fn context_menu(&self, id: NodeId) -> Vec<MenuEntry> {
        let Some(data) = self.item(id) else {
            return Vec::new();
        };
        let mut entries = vec![
            MenuEntry::item(MenuCommand::AddWcBookmark),
            MenuEntry::item(MenuCommand::AddRepoBookmark),
        ];
        if data.folder_type == FolderType::Bookmark {
            let username = self
                .context_for(id)
                .filter(|context| context.has_username())
                .map(|context| context.username.as_str());
            entries.push(MenuEntry::item(MenuCommand::RemoveBookmark));
            entries.push(MenuEntry::Separator);
            entries.push(MenuEntry::item(MenuCommand::Login));
            entries.push(MenuEntry::Item {
                command: MenuCommand::Logout,
                label: match username {
                    Some(name) => format!("Logout '{name}'"),
                    None => MenuCommand::Logout.label().to_string(),
                },
                enabled: username.is_some(),
            });
        }
        if matches!(data.folder_type, FolderType::Bookmark | FolderType::Normal) {
            entries.push(MenuEntry::Separator);
            let commands: &[MenuCommand] = if is_valid_url(&data.path) {
                &[
                    MenuCommand::Delete,
                    MenuCommand::Mkdir,
                    MenuCommand::Export,
                    MenuCommand::Unlock,
                ]
            } else {
                &[
                    MenuCommand::Update,
                    MenuCommand::Commit,
                    MenuCommand::Merge,
                    MenuCommand::Delete,
                    MenuCommand::Mkdir,
                    MenuCommand::Export,
                    MenuCommand::Unlock,
                ]
            };
            entries.extend(commands.iter().copied().map(MenuEntry::item));
        }
        entries
    }

    fn bookmark_children(&self) -> Vec<PendingChild> {
        self.bookmarks
            .iter()
            .map(|bookmark| {
                let path = bookmark.path();
                let icon = if is_valid_url(path) {
                    FolderIcon::Repository
                } else if self.client.is_working_copy(Path::new(path)) {
                    FolderIcon::Folder
                } else {
                    FolderIcon::NonVersionedFolder
                };
                PendingChild {
                    data: FolderItemData::new(FolderType::Bookmark, path, beautify_path(path)),
                    icon,
                    expandable: true,
                }
            })
            .collect()
    }

    fn find_child(&self, parent: NodeId, path: &str) -> Option<NodeId> {
        self.tree
            .children(parent)
            .iter()
            .copied()
            .find(|child| self.item(*child).is_some_and(|data| data.path == path))
    }

    fn set_state(&mut self, id: NodeId, state: NodeState) {
        if let Some(node) = self.tree.get_mut(id) {
            node.set_state(state);
        }
    }
}
