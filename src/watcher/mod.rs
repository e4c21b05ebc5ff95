//! Hot-reload watcher for function source directories.
//!
//! # Architecture
//!
//! ```text
//! HotReloadWatcher
//!   - PathRegistry (one entry per distinct directory)
//!       - notify::RecommendedWatcher (recursive)
//!       - WatchedPath
//!           - targets sharing the directory
//!           - PathDebouncer (last accepted change)
//!   - ChangeSink (bounded, drop-newest)
//!         |
//!    ChangeReceiver -> reload collaborator
//! ```

mod debouncer;
mod error;
mod event;
mod hot_reload;
mod path_registry;

pub use debouncer::PathDebouncer;
pub use error::WatchError;
pub use event::{ChangeEvent, ChangeReceiver, ChangeSink};
pub use hot_reload::{HotReloadWatcher, WatcherState};
pub use path_registry::{PathRegistry, WatchEntry, WatchedPath};
