use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings stored in `config.toml`.
///
/// Config keys (TOML): `auth_per_bookmark`, `shared_username`, `svn`, `bookmarks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Store credentials per bookmark instead of one shared login.
    #[serde(default = "default_true")]
    pub auth_per_bookmark: bool,
    /// Username of the shared login used when `auth_per_bookmark` is off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_username: Option<String>,
    #[serde(default)]
    pub svn: SvnSettings,
    /// Bookmarks in display order.
    #[serde(default)]
    pub bookmarks: Vec<BookmarkConfig>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            auth_per_bookmark: true,
            shared_username: None,
            svn: SvnSettings::default(),
            bookmarks: Vec::new(),
        }
    }
}

impl AppSettings {
    /// Drop blank and duplicate bookmark paths, keeping the first occurrence.
    pub(crate) fn normalized(mut self) -> Self {
        let mut seen = std::collections::HashSet::new();
        self.bookmarks.retain(|bookmark| {
            let path = bookmark.path.trim();
            !path.is_empty() && seen.insert(path.to_string())
        });
        for bookmark in &mut self.bookmarks {
            bookmark.path = bookmark.path.trim().to_string();
            if bookmark
                .username
                .as_deref()
                .is_some_and(|name| name.trim().is_empty())
            {
                bookmark.username = None;
            }
        }
        if self
            .shared_username
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            self.shared_username = None;
        }
        self
    }
}

/// One persisted bookmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkConfig {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// How the Subversion client is invoked.
///
/// Config keys: `binary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SvnSettings {
    #[serde(default = "default_svn_binary")]
    pub binary: PathBuf,
}

impl Default for SvnSettings {
    fn default() -> Self {
        Self {
            binary: default_svn_binary(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_svn_binary() -> PathBuf {
    PathBuf::from("svn")
}

/// Errors that may occur while loading or saving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to create the config directory.
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to read the config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to write the config file.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The config file is not valid TOML for [`AppSettings`].
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to serialize settings.
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
    /// No usable config directory found.
    #[error("No suitable config directory found")]
    NoConfigDir,
}
