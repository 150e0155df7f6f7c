use std::path::{Path, PathBuf};

use tracing::info;

use crate::app_dirs;

use super::types::{AppSettings, ConfigError};
use super::{CONFIG_FILE_NAME, map_app_dir_error};

/// Resolve the configuration file path, ensuring the parent directory exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load settings from the default location, returning defaults if missing.
pub fn load_or_default() -> Result<AppSettings, ConfigError> {
    load_settings_from(&config_path()?)
}

/// Load settings from `path`; a missing file yields defaults.
pub fn load_settings_from(path: &Path) -> Result<AppSettings, ConfigError> {
    if !path.exists() {
        info!("No config at {}; using defaults", path.display());
        return Ok(AppSettings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: AppSettings = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = settings.normalized();
    info!(
        bookmarks = settings.bookmarks.len(),
        "Loaded config from {}",
        path.display()
    );
    Ok(settings)
}
