use std::{
    path::PathBuf,
    sync::{Mutex, OnceLock},
};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_HOME: &str = "SVNBROWSER_CONFIG_HOME";
const DISABLE_KEYRING: &str = "SVNBROWSER_DISABLE_KEYRING";

/// Points the app at a private config root and keeps the OS keyring out of tests.
pub struct SvnbrowserEnvGuard {
    previous: Option<String>,
    _lock: std::sync::MutexGuard<'static, ()>,
}

impl SvnbrowserEnvGuard {
    pub fn set_config_home(path: PathBuf) -> Self {
        let lock = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        let previous = std::env::var(CONFIG_HOME).ok();
        // SAFETY: tests run under a global lock to prevent concurrent env mutations.
        unsafe {
            std::env::set_var(CONFIG_HOME, path);
            std::env::set_var(DISABLE_KEYRING, "1");
        }
        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for SvnbrowserEnvGuard {
    fn drop(&mut self) {
        // SAFETY: still holding the global lock.
        unsafe {
            match &self.previous {
                Some(value) => std::env::set_var(CONFIG_HOME, value),
                None => std::env::remove_var(CONFIG_HOME),
            }
        }
    }
}
