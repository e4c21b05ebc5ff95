//! Error types for the hot-reload watcher.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from native watch setup.
///
/// None of these abort [`HotReloadWatcher::start_watching`](super::HotReloadWatcher::start_watching);
/// the affected directory is logged and skipped.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to initialize watcher: {reason}")]
    InitFailed { reason: String },

    #[error("Cannot watch path {path}: {reason}")]
    PathWatchFailed { path: PathBuf, reason: String },

    #[error("Watch path {path} is missing or not a directory")]
    NotADirectory { path: PathBuf },
}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        WatchError::InitFailed {
            reason: e.to_string(),
        }
    }
}
