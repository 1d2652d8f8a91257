//! Log setup
//!
//! The terminal belongs to the TUI, so logs go to a file:
//! `~/.cache/weathernews/weathernews.log` on Linux unless `--log-file` is
//! given. The filter is read from `WEATHERNEWS_LOG` (e.g.
//! `WEATHERNEWS_LOG=weathernews=debug`) and defaults to `info`.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use thiserror::Error;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "WEATHERNEWS_LOG";

const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum LogError {
    #[error("No log directory available; pass --log-file")]
    NoLogDir,

    #[error("Failed to open log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to install logger: {0}")]
    Init(#[from] TryInitError),
}

/// Log file used when none is given
pub fn default_log_path() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "weathernews")?;
    Some(project_dirs.cache_dir().join("weathernews.log"))
}

/// Opens the log file for appending, creating parent directories
fn open_log_file(path: &Path) -> Result<File, std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber, returning the file being written
pub fn init(path: Option<&Path>) -> Result<PathBuf, LogError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_log_path().ok_or(LogError::NoLogDir)?,
    };
    let file = open_log_file(&path)?;

    tracing_subscriber::registry()
        .with(filter())
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()?;

    Ok(path)
}
