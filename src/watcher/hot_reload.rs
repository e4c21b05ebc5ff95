//! Hot-reload watcher for function source directories.
//!
//! Watches every configured function directory and emits a [`ChangeEvent`]
//! when a relevant source file changes, so the collaborator can re-register
//! the function code with the emulator.
//!
//! [`ChangeEvent`]: super::ChangeEvent

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Event, RecursiveMode, Watcher};

use crate::config::HotReloadConfig;
use crate::target::{WatchTarget, build_targets};

use super::error::WatchError;
use super::event::{ChangeReceiver, ChangeSink};
use super::path_registry::{PathRegistry, WatchedPath};

/// Lifecycle state of the watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Idle,
    Watching,
}

/// Watches function directories and emits debounced change events.
///
/// `start_watching` and `stop_watching` are driven by a single caller.
/// Native callbacks run on the notify backend threads and only touch the
/// per-directory state they own.
pub struct HotReloadWatcher {
    config: HotReloadConfig,
    project_root: PathBuf,
    sink: ChangeSink,
    registry: PathRegistry,
    state: WatcherState,
}

impl HotReloadWatcher {
    /// Create an idle watcher and the receiver its events arrive on.
    pub fn new(config: HotReloadConfig, project_root: PathBuf) -> (Self, ChangeReceiver) {
        let (sink, receiver) = ChangeSink::channel(config.event_buffer);
        (Self::with_sink(config, project_root, sink), receiver)
    }

    /// Create an idle watcher emitting into an existing sink.
    pub fn with_sink(config: HotReloadConfig, project_root: PathBuf, sink: ChangeSink) -> Self {
        Self {
            config,
            project_root,
            sink,
            registry: PathRegistry::new(),
            state: WatcherState::Idle,
        }
    }

    /// Build targets from configuration and start watching them.
    ///
    /// Returns the number of directories being watched afterwards.
    pub fn start_watching(&mut self) -> usize {
        if self.state == WatcherState::Watching {
            crate::debug_event!("watcher", "already watching");
            return self.registry.len();
        }

        let resolver = self.config.extension_resolver();
        let targets = build_targets(&self.config.lambda_paths, &self.project_root, &resolver);
        self.start_watching_targets(targets)
    }

    /// Start watching already-resolved targets.
    ///
    /// No-op while watching. Stays idle when hot reload is disabled or no
    /// target points at an existing directory.
    pub fn start_watching_targets(&mut self, targets: Vec<WatchTarget>) -> usize {
        if self.state == WatcherState::Watching {
            crate::debug_event!("watcher", "already watching");
            return self.registry.len();
        }

        if !self.config.enabled {
            crate::debug_event!("watcher", "hot reload disabled");
            return 0;
        }

        if targets.is_empty() {
            crate::debug_event!("watcher", "no lambda paths configured");
            return 0;
        }

        let interval = self.config.watch_interval();
        let (groups, skipped) = PathRegistry::group_targets(targets, interval, &self.sink);

        for target in &skipped {
            let err = WatchError::NotADirectory {
                path: target.local_path.clone(),
            };
            tracing::warn!("[watcher] skipping {}: {err}", target.function_name);
        }

        for group in groups {
            let watched = Arc::new(group);
            match watch_directory(&watched) {
                Ok(handle) => {
                    crate::log_event!(
                        "watcher",
                        "watching",
                        "{} ({} functions)",
                        watched.root().display(),
                        watched.targets().len()
                    );
                    self.registry.insert(watched, Some(handle));
                }
                Err(e) => {
                    tracing::warn!("[watcher] {e}");
                }
            }
        }

        if self.registry.is_empty() {
            crate::debug_event!("watcher", "nothing to watch, staying idle");
            return 0;
        }

        self.state = WatcherState::Watching;
        crate::log_event!(
            "watcher",
            "started",
            "{} directories, interval {}ms",
            self.registry.len(),
            interval.as_millis()
        );
        self.registry.len()
    }

    /// Close every native watch and clear debounce state.
    ///
    /// Safe to call repeatedly or before any start.
    pub fn stop_watching(&mut self) {
        if self.state == WatcherState::Idle && self.registry.is_empty() {
            return;
        }

        let closed = self.registry.clear();
        self.state = WatcherState::Idle;
        crate::log_event!("watcher", "stopped", "{closed} directories");
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    pub fn is_watching(&self) -> bool {
        self.state == WatcherState::Watching
    }

    /// Number of live native watch handles.
    pub fn watch_count(&self) -> usize {
        self.registry.handle_count()
    }

    /// Watched directories in registration order.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        self.registry.paths().map(Path::to_path_buf).collect()
    }

    /// Targets currently being watched, grouped by directory order.
    pub fn targets(&self) -> Vec<WatchTarget> {
        self.registry
            .entries()
            .flat_map(|entry| entry.path.targets().iter().cloned())
            .collect()
    }

    /// Events dropped because the collaborator fell behind.
    pub fn dropped_events(&self) -> u64 {
        self.sink.dropped()
    }
}

impl Drop for HotReloadWatcher {
    fn drop(&mut self) {
        self.stop_watching();
    }
}

/// Register a recursive native watch routing into `watched`.
fn watch_directory(watched: &Arc<WatchedPath>) -> Result<notify::RecommendedWatcher, WatchError> {
    let callback_state = Arc::clone(watched);
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            callback_state.handle_event(&event);
        }
        Err(e) => {
            tracing::error!(
                "[watcher] file watch error on {}: {e}",
                callback_state.root().display()
            );
        }
    })?;

    watcher
        .watch(watched.root(), RecursiveMode::Recursive)
        .map_err(|e| WatchError::PathWatchFailed {
            path: watched.root().to_path_buf(),
            reason: e.to_string(),
        })?;

    Ok(watcher)
}
