use std::collections::HashMap;

use tracing::{debug, warn};

/// Keyring service name under which passwords are stored.
pub const KEYRING_SERVICE: &str = "svnbrowser";
const DISABLE_ENV: &str = "SVNBROWSER_DISABLE_KEYRING";

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Keyring unavailable: {0}")]
    Unavailable(String),
    #[error("Keyring access failed for {account}: {message}")]
    Keyring { account: String, message: String },
}

/// Which login a password belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    Bookmark(String),
    Shared,
}

impl CredentialKey {
    /// Account name used in the keyring.
    pub fn account(&self) -> String {
        match self {
            CredentialKey::Bookmark(path) => format!("bookmark:{path}"),
            CredentialKey::Shared => "shared".to_string(),
        }
    }
}

/// Password storage backed by the OS keyring with a session cache.
///
/// Passwords set during this session are always answered from memory, so a
/// keyring failure only costs persistence across launches.
#[derive(Debug)]
pub struct CredentialStore {
    use_keyring: bool,
    session: HashMap<String, String>,
}

impl CredentialStore {
    /// Store honouring `SVNBROWSER_DISABLE_KEYRING`.
    pub fn new() -> Self {
        let use_keyring = !keyring_disabled();
        if !use_keyring {
            debug!("Keyring disabled; passwords kept for this session only");
        }
        Self {
            use_keyring,
            session: HashMap::new(),
        }
    }

    /// Store that never touches the OS keyring.
    pub fn in_memory() -> Self {
        Self {
            use_keyring: false,
            session: HashMap::new(),
        }
    }

    pub fn uses_keyring(&self) -> bool {
        self.use_keyring
    }

    pub fn get(&self, key: &CredentialKey) -> Result<Option<String>, CredentialError> {
        let account = key.account();
        if let Some(password) = self.session.get(&account) {
            return Ok(Some(password.clone()));
        }
        if !self.use_keyring {
            return Ok(None);
        }
        match entry(&account)?.get_password() {
            Ok(password) => Ok(Some(password)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(keyring_error(account, err)),
        }
    }

    /// Like [`get`](Self::get) but logs and swallows keyring failures.
    pub fn lookup(&self, key: &CredentialKey) -> Option<String> {
        self.get(key).unwrap_or_else(|err| {
            warn!("Password lookup failed: {err}");
            None
        })
    }

    pub fn set(&mut self, key: &CredentialKey, password: &str) -> Result<(), CredentialError> {
        let account = key.account();
        if password.is_empty() {
            return self.delete(key);
        }
        self.session.insert(account.clone(), password.to_string());
        if !self.use_keyring {
            return Ok(());
        }
        entry(&account)?
            .set_password(password)
            .map_err(|err| keyring_error(account, err))
    }

    pub fn delete(&mut self, key: &CredentialKey) -> Result<(), CredentialError> {
        let account = key.account();
        self.session.remove(&account);
        if !self.use_keyring {
            return Ok(());
        }
        match entry(&account)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(keyring_error(account, err)),
        }
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

fn entry(account: &str) -> Result<keyring::Entry, CredentialError> {
    keyring::Entry::new(KEYRING_SERVICE, account)
        .map_err(|err| CredentialError::Unavailable(err.to_string()))
}

fn keyring_error(account: String, err: keyring::Error) -> CredentialError {
    CredentialError::Keyring {
        account,
        message: err.to_string(),
    }
}

fn keyring_disabled() -> bool {
    std::env::var(DISABLE_ENV)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
