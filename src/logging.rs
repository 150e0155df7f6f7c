//! Tracing output for svnbrowser.
//!
//! Every launch logs to the terminal and to its own file in the app `logs`
//! folder, named `svnbrowser_<local time>.log`. Older launch logs beyond
//! [`KEPT_LAUNCH_LOGS`] are deleted at startup. `RUST_LOG` overrides the
//! default `info` filter.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::OnceLock,
    time::SystemTime,
};

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::app_dirs;

pub const KEPT_LAUNCH_LOGS: usize = 10;
const LOG_PREFIX: &str = "svnbrowser_";
const LOG_EXTENSION: &str = "log";

/// Keeps the file writer flushing until process exit.
static FILE_WRITER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Log folder unavailable: {0}")]
    Directory(#[from] app_dirs::AppDirError),
    #[error("Cannot list old logs in {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot delete old log {path}: {source}")]
    RemoveFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot open log file {path}: {source}")]
    CreateLogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot name the log file: {0}")]
    FormatTime(#[from] time::error::Format),
    #[error("A tracing subscriber is already installed: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Start logging for this launch. Repeated calls do nothing.
///
/// On error nothing is installed and the browser runs without logs.
pub fn init() -> Result<(), LoggingError> {
    if FILE_WRITER_GUARD.get().is_some() {
        return Ok(());
    }

    let folder = app_dirs::logs_dir()?;
    let file_name = launch_log_name(launch_time())?;
    let log_path = folder.join(&file_name);
    create_empty(&log_path)?;
    prune_old_logs(&folder, KEPT_LAUNCH_LOGS)?;

    let (file_writer, guard) = tracing_appender::non_blocking(rolling::never(&folder, file_name));
    let timer = local_timer();
    let terminal = fmt::layer()
        .with_timer(timer.clone())
        .with_writer(std::io::stdout);
    let file = fmt::layer()
        .with_ansi(false)
        .with_timer(timer)
        .with_writer(file_writer);
    tracing::subscriber::set_global_default(
        Registry::default().with(filter()).with(terminal).with(file),
    )?;
    let _ = FILE_WRITER_GUARD.set(guard);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "svnbrowser log at {}",
        log_path.display()
    );
    Ok(())
}

fn create_empty(path: &Path) -> Result<(), LoggingError> {
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(_) => Ok(()),
        Err(source) => Err(LoggingError::CreateLogFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn is_launch_log(path: &Path) -> bool {
    let named_like_ours = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(LOG_PREFIX));
    named_like_ours && path.extension().is_some_and(|ext| ext == LOG_EXTENSION) && path.is_file()
}

/// Delete the oldest launch logs in `folder` so at most `keep` remain.
/// Files not named like launch logs are left alone.
fn prune_old_logs(folder: &Path, keep: usize) -> Result<(), LoggingError> {
    let entries = fs::read_dir(folder).map_err(|source| LoggingError::ReadDir {
        path: folder.to_path_buf(),
        source,
    })?;
    let mut launch_logs: Vec<(SystemTime, PathBuf)> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_launch_log(path))
        .map(|path| {
            let written = fs::metadata(&path)
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (written, path)
        })
        .collect();
    if launch_logs.len() <= keep {
        return Ok(());
    }

    launch_logs.sort_by_key(|(written, _)| *written);
    let stale = launch_logs.len() - keep;
    for (_, path) in launch_logs.into_iter().take(stale) {
        fs::remove_file(&path).map_err(|source| LoggingError::RemoveFile { path, source })?;
    }
    Ok(())
}

fn launch_log_name(started: OffsetDateTime) -> Result<String, LoggingError> {
    const STAMP: &[FormatItem<'_>] =
        format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    Ok(format!("{LOG_PREFIX}{}.{LOG_EXTENSION}", started.format(STAMP)?))
}

fn local_timer() -> fmt::time::OffsetTime<time::format_description::BorrowedFormatItem<'static>> {
    const LINE_STAMP: &[FormatItem<'static>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, LINE_STAMP.into())
}

fn launch_time() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
