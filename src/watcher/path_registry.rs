//! Registry of watched directories.
//!
//! One entry per distinct directory, however many targets point at it. The
//! entry owns the native watch handle and the debounce state, and keeps every
//! target sharing the directory so a change still reaches each function.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use indexmap::IndexMap;
use notify::{Event, EventKind};

use crate::target::WatchTarget;

use super::debouncer::PathDebouncer;
use super::event::{ChangeEvent, ChangeSink};

/// Shared state behind one watched directory.
///
/// The native watch callback holds an `Arc` of this.
#[derive(Debug)]
pub struct WatchedPath {
    root: PathBuf,
    targets: Vec<WatchTarget>,
    debouncer: PathDebouncer,
    sink: ChangeSink,
}

impl WatchedPath {
    pub fn new(root: PathBuf, interval: Duration, sink: ChangeSink) -> Self {
        Self {
            root,
            targets: Vec::new(),
            debouncer: PathDebouncer::new(interval),
            sink,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn targets(&self) -> &[WatchTarget] {
        &self.targets
    }

    /// Route a raw notify event. Returns the number of change events emitted.
    pub fn handle_event(&self, event: &Event) -> usize {
        if matches!(event.kind, EventKind::Access(_)) {
            return 0;
        }

        // Some backends omit the path for certain operations
        let Some(changed) = event.paths.first() else {
            crate::debug_event!("watcher", "no path", "{:?}", event.kind);
            return 0;
        };

        self.handle_change(changed)
    }

    /// Filter, debounce and emit for a change to `changed` observed now.
    pub fn handle_change(&self, changed: &Path) -> usize {
        self.handle_change_at(changed, Instant::now())
    }

    /// Filter, debounce and emit for a change to `changed` observed at `now`.
    ///
    /// Extension filtering is per target. The debounce decision is taken once
    /// for the directory, and every matching target is notified on acceptance.
    pub fn handle_change_at(&self, changed: &Path, now: Instant) -> usize {
        let matching: Vec<&WatchTarget> =
            self.targets.iter().filter(|t| t.matches(changed)).collect();

        if matching.is_empty() {
            crate::debug_event!("watcher", "unmatched", "{}", changed.display());
            return 0;
        }

        if !self.debouncer.try_accept_at(now) {
            crate::debug_event!("watcher", "suppressed", "{}", changed.display());
            return 0;
        }

        let changed_file = if changed.is_absolute() {
            changed.to_path_buf()
        } else {
            self.root.join(changed)
        };
        let timestamp = Utc::now();

        let mut emitted = 0;
        for target in matching {
            crate::log_event!(
                "watcher",
                "changed",
                "{} ({})",
                changed_file.display(),
                target.function_name
            );
            let queued = self.sink.emit(ChangeEvent {
                function_name: target.function_name.clone(),
                local_path: self.root.clone(),
                changed_file: changed_file.clone(),
                handler: target.handler.clone(),
                runtime: target.runtime.clone(),
                timestamp,
            });
            if queued {
                emitted += 1;
            }
        }
        emitted
    }
}

/// A registered directory and its native watch handle.
pub struct WatchEntry {
    pub path: Arc<WatchedPath>,
    pub handle: Option<notify::RecommendedWatcher>,
}

/// Directory -> entry, in registration order.
#[derive(Default)]
pub struct PathRegistry {
    entries: IndexMap<PathBuf, WatchEntry>,
}

impl PathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group targets by directory, keeping only existing directories.
    ///
    /// Returns one `WatchedPath` per distinct directory plus the targets that
    /// were skipped.
    pub fn group_targets(
        targets: Vec<WatchTarget>,
        interval: Duration,
        sink: &ChangeSink,
    ) -> (Vec<WatchedPath>, Vec<WatchTarget>) {
        let mut grouped: IndexMap<PathBuf, WatchedPath> = IndexMap::new();
        let mut skipped = Vec::new();

        for target in targets {
            if !target.local_path.is_dir() {
                skipped.push(target);
                continue;
            }
            grouped
                .entry(target.local_path.clone())
                .or_insert_with(|| {
                    WatchedPath::new(target.local_path.clone(), interval, sink.clone())
                })
                .targets
                .push(target);
        }

        (grouped.into_values().collect(), skipped)
    }

    /// Register a directory. An existing entry for the same path is kept.
    pub fn insert(&mut self, path: Arc<WatchedPath>, handle: Option<notify::RecommendedWatcher>) -> bool {
        if self.entries.contains_key(path.root()) {
            return false;
        }
        self.entries
            .insert(path.root().to_path_buf(), WatchEntry { path, handle });
        true
    }

    /// Number of watched directories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of live native handles.
    pub fn handle_count(&self) -> usize {
        self.entries.values().filter(|e| e.handle.is_some()).count()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys().map(PathBuf::as_path)
    }

    pub fn entries(&self) -> impl Iterator<Item = &WatchEntry> {
        self.entries.values()
    }

    /// Drop every entry, closing native handles and debounce state.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }
}
