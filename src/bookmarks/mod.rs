//! Ordered bookmark roots and the credentials attached to them.
//!
//! A bookmark is either a working-copy path or a repository URL. Each one may
//! carry its own [`AuthContext`]; when `auth_per_bookmark` is off, every
//! bookmark shares a single context instead.

mod credentials;


pub use credentials::{CredentialError, CredentialKey, CredentialStore, KEYRING_SERVICE};

use crate::config::{AppSettings, BookmarkConfig};
use crate::vcs::AuthContext;

/// A bookmarked root path with its optional stored login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    path: String,
    context: Option<AuthContext>,
}

impl Bookmark {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn context(&self) -> Option<&AuthContext> {
        self.context.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmarks {
    entries: Vec<Bookmark>,
    auth_per_bookmark: bool,
    shared_context: Option<AuthContext>,
}

impl Default for Bookmarks {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            auth_per_bookmark: true,
            shared_context: None,
        }
    }
}

impl Bookmarks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the collection from persisted settings, asking `password_for`
    /// for any stored password of a remembered username.
    pub fn from_settings(
        settings: &AppSettings,
        mut password_for: impl FnMut(&CredentialKey) -> Option<String>,
    ) -> Self {
        let mut bookmarks = Self {
            auth_per_bookmark: settings.auth_per_bookmark,
            ..Self::default()
        };
        for entry in &settings.bookmarks {
            if !bookmarks.add(&entry.path) {
                continue;
            }
            if let Some(username) = entry.username.as_deref() {
                let key = CredentialKey::Bookmark(entry.path.clone());
                let context = AuthContext::new(username, password_for(&key));
                bookmarks.set_context(&entry.path, context);
            }
        }
        if let Some(username) = settings.shared_username.as_deref() {
            let password = password_for(&CredentialKey::Shared);
            bookmarks.shared_context = Some(AuthContext::new(username, password));
        }
        bookmarks
    }

    /// Write paths, usernames and the auth flag back into `settings`.
    pub fn store_in(&self, settings: &mut AppSettings) {
        settings.auth_per_bookmark = self.auth_per_bookmark;
        settings.shared_username = self
            .shared_context
            .as_ref()
            .filter(|context| context.has_username())
            .map(|context| context.username.clone());
        settings.bookmarks = self
            .entries
            .iter()
            .map(|bookmark| BookmarkConfig {
                path: bookmark.path.clone(),
                username: bookmark
                    .context
                    .as_ref()
                    .filter(|context| context.has_username())
                    .map(|context| context.username.clone()),
            })
            .collect();
    }

    /// Append `path`; returns false when it is blank or already present.
    pub fn add(&mut self, path: &str) -> bool {
        let path = path.trim();
        if path.is_empty() || self.contains(path) {
            return false;
        }
        self.entries.push(Bookmark {
            path: path.to_string(),
            context: None,
        });
        true
    }

    /// Remove the bookmark at exactly `path` along with its stored context.
    pub fn remove(&mut self, path: &str) -> bool {
        let Some(index) = self.position(path) else {
            return false;
        };
        self.entries.remove(index);
        true
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.position(path).is_some()
    }

    pub fn get_bookmark(&self, index: usize) -> Option<&Bookmark> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bookmark> {
        self.entries.iter()
    }

    /// Stored context of the bookmark at exactly `path`.
    pub fn get_context(&self, path: &str) -> Option<&AuthContext> {
        self.position(path)
            .and_then(|index| self.entries[index].context.as_ref())
    }

    /// Context used for calls below the bookmark at `path`, honouring the
    /// auth-per-bookmark flag. Unknown paths resolve to none.
    pub fn effective_context(&self, path: &str) -> Option<&AuthContext> {
        if !self.contains(path) {
            return None;
        }
        if self.auth_per_bookmark {
            self.get_context(path)
        } else {
            self.shared_context.as_ref()
        }
    }

    pub fn set_context(&mut self, path: &str, context: AuthContext) -> bool {
        match self.position(path) {
            Some(index) => {
                self.entries[index].context = Some(context);
                true
            }
            None => false,
        }
    }

    pub fn clear_context(&mut self, path: &str) -> bool {
        match self.position(path) {
            Some(index) => self.entries[index].context.take().is_some(),
            None => false,
        }
    }

    pub fn auth_per_bookmark(&self) -> bool {
        self.auth_per_bookmark
    }

    pub fn set_auth_per_bookmark(&mut self, enabled: bool) {
        self.auth_per_bookmark = enabled;
    }

    pub fn shared_context(&self) -> Option<&AuthContext> {
        self.shared_context.as_ref()
    }

    pub fn set_shared_context(&mut self, context: Option<AuthContext>) {
        self.shared_context = context;
    }

    fn position(&self, path: &str) -> Option<usize> {
        self.entries.iter().position(|bookmark| bookmark.path == path)
    }
}
