//! Persisted settings: bookmarks, the auth-per-bookmark flag and the client binary.
//!
//! Settings live in `config.toml` under the application directory. Passwords
//! are never written here; see [`crate::bookmarks::CredentialStore`].

use crate::app_dirs;

mod load;
mod save;
mod types;


/// Default filename used to store the settings.
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub use load::{config_path, load_or_default, load_settings_from};
pub use save::{save, save_settings_to_path};
pub use types::{AppSettings, BookmarkConfig, ConfigError, SvnSettings};

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => {
            ConfigError::CreateDir { path, source }
        }
    }
}
