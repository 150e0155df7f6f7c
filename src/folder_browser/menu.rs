use crate::actions::ActionKind;

/// Commands offered by the folder context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuCommand {
    AddWcBookmark,
    AddRepoBookmark,
    RemoveBookmark,
    Login,
    Logout,
    Update,
    Commit,
    Merge,
    Delete,
    Mkdir,
    Export,
    Unlock,
}

impl MenuCommand {
    pub fn label(self) -> &'static str {
        match self {
            MenuCommand::AddWcBookmark => "Add Working Copy Bookmark...",
            MenuCommand::AddRepoBookmark => "Add Repository Bookmark...",
            MenuCommand::RemoveBookmark => "Remove Bookmark",
            MenuCommand::Login => "Login...",
            MenuCommand::Logout => "Logout",
            MenuCommand::Update => "Update...",
            MenuCommand::Commit => "Commit...",
            MenuCommand::Merge => "Merge...",
            MenuCommand::Delete => "Delete...",
            MenuCommand::Mkdir => "Make Directory...",
            MenuCommand::Export => "Export...",
            MenuCommand::Unlock => "Unlock...",
        }
    }

    /// Action started by this command on `path`, if it is a version-control action.
    pub fn action_kind(self, path: &str) -> Option<ActionKind> {
        match self {
            MenuCommand::Update => Some(ActionKind::update()),
            MenuCommand::Commit => Some(ActionKind::commit()),
            MenuCommand::Merge => Some(ActionKind::merge(path)),
            MenuCommand::Delete => Some(ActionKind::delete()),
            MenuCommand::Mkdir => Some(ActionKind::mkdir()),
            MenuCommand::Export => Some(ActionKind::export()),
            MenuCommand::Unlock => Some(ActionKind::unlock()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Item {
        command: MenuCommand,
        label: String,
        enabled: bool,
    },
    Separator,
}

impl MenuEntry {
    pub(crate) fn item(command: MenuCommand) -> Self {
        MenuEntry::Item {
            command,
            label: command.label().to_string(),
            enabled: true,
        }
    }

    pub fn command(&self) -> Option<MenuCommand> {
        match self {
            MenuEntry::Item { command, .. } => Some(*command),
            MenuEntry::Separator => None,
        }
    }
}
