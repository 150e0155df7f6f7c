//! Library exports for the binary and the integration tests.
/// Version-control actions run on worker threads.
pub mod actions;
/// Application directory resolution.
pub mod app_dirs;
/// Bookmarked roots and their logins.
pub mod bookmarks;
/// Persisted settings.
pub mod config;
/// egui desktop front-end.
pub mod egui_app;
/// Lazily populated folder tree.
pub mod folder_browser;
/// Logging setup for the application.
pub mod logging;
/// Subversion client contract and command-line implementation.
pub mod vcs;

#[cfg(test)]
pub(crate) mod test_support;
