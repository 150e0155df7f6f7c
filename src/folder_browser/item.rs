/// Role of a node in the folder tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FolderType {
    /// The synthetic root holding the bookmarks.
    Bookmarks,
    Bookmark,
    Normal,
}

/// Payload attached to every tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderItemData {
    pub folder_type: FolderType,
    /// Full local path or repository URL; empty for the root.
    pub path: String,
    /// Display text.
    pub label: String,
    /// False for placeholders such as the root.
    pub is_real: bool,
}

impl FolderItemData {
    pub fn root() -> Self {
        Self {
            folder_type: FolderType::Bookmarks,
            path: String::new(),
            label: "Bookmarks".to_string(),
            is_real: false,
        }
    }

    pub fn new(folder_type: FolderType, path: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            folder_type,
            path: path.into(),
            label: label.into(),
            is_real: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FolderIcon {
    Computer,
    /// Local folder under version control.
    Folder,
    NonVersionedFolder,
    Repository,
}

/// Expansion state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeState {
    #[default]
    Collapsed,
    Expanding,
    Expanded,
    Collapsing,
}

/// A node as the tree stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    data: FolderItemData,
    icon: FolderIcon,
    state: NodeState,
    expandable: bool,
}

impl FolderNode {
    pub(crate) fn new(data: FolderItemData, icon: FolderIcon, expandable: bool) -> Self {
        Self {
            data,
            icon,
            state: NodeState::Collapsed,
            expandable,
        }
    }

    pub fn data(&self) -> &FolderItemData {
        &self.data
    }

    pub fn icon(&self) -> FolderIcon {
        self.icon
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn is_expanded(&self) -> bool {
        self.state == NodeState::Expanded
    }

    /// Whether the UI should draw an expander for this node.
    pub fn is_expandable(&self) -> bool {
        self.expandable
    }

    pub(crate) fn set_state(&mut self, state: NodeState) {
        self.state = state;
    }

    pub(crate) fn set_expandable(&mut self, expandable: bool) {
        self.expandable = expandable;
    }
}
