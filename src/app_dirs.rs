//! Where svnbrowser keeps its files.
//!
//! `config.toml` sits directly in `<config root>/.svnbrowser` and launch logs
//! go to its `logs` subfolder. The config root is the platform config folder
//! unless `SVNBROWSER_CONFIG_HOME` names another one.

use std::{
    path::PathBuf,
    sync::{LazyLock, Mutex},
};

use directories::BaseDirs;
use thiserror::Error;

pub const APP_DIR_NAME: &str = ".svnbrowser";
/// Replaces the platform config folder when set.
pub const CONFIG_HOME_ENV: &str = "SVNBROWSER_CONFIG_HOME";
const LOGS_DIR_NAME: &str = "logs";

static ROOT_OVERRIDE: LazyLock<Mutex<Option<PathBuf>>> = LazyLock::new(|| Mutex::new(None));

#[derive(Debug, Error)]
pub enum AppDirError {
    #[error("Cannot locate a config folder for svnbrowser; set SVNBROWSER_CONFIG_HOME")]
    NoBaseDir,
    #[error("Cannot create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// `<config root>/.svnbrowser`, created on first use.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    let root = resolve_config_root()
        .ok_or(AppDirError::NoBaseDir)?
        .join(APP_DIR_NAME);
    ensure_dir(root)
}

/// Folder for per-launch log files, created on first use.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    ensure_dir(app_root_dir()?.join(LOGS_DIR_NAME))
}

fn ensure_dir(path: PathBuf) -> Result<PathBuf, AppDirError> {
    match std::fs::create_dir_all(&path) {
        Ok(()) => Ok(path),
        Err(source) => Err(AppDirError::CreateDir { path, source }),
    }
}

fn resolve_config_root() -> Option<PathBuf> {
    let overridden = ROOT_OVERRIDE.lock().ok().and_then(|root| root.clone());
    overridden
        .or_else(|| std::env::var_os(CONFIG_HOME_ENV).map(PathBuf::from))
        .or_else(|| BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()))
}

#[cfg(test)]
static OVERRIDE_SERIAL: Mutex<()> = Mutex::new(());

/// Points the config root at a scratch folder until dropped. Only one guard
/// is alive at a time across the test binary.
#[cfg(test)]
pub(crate) struct ConfigBaseGuard {
    _serial: std::sync::MutexGuard<'static, ()>,
}

#[cfg(test)]
impl ConfigBaseGuard {
    pub(crate) fn set(root: PathBuf) -> Self {
        let serial = OVERRIDE_SERIAL
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Self::store(Some(root));
        Self { _serial: serial }
    }

    fn store(root: Option<PathBuf>) {
        let mut slot = ROOT_OVERRIDE
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = root;
    }
}

#[cfg(test)]
impl Drop for ConfigBaseGuard {
    fn drop(&mut self) {
        Self::store(None);
    }
}
