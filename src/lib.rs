//! Runtime-aware hot reload for locally emulated serverless functions.
//!
//! Watches function source directories, filters changes by the file
//! extensions that matter for each function's runtime, debounces bursts of
//! edits per directory and hands change events to a reload collaborator.
//! A readiness probe confirms the emulator is reachable before reloads.

pub mod cli;
pub mod config;
pub mod expand;
pub mod logging;
pub mod probe;
pub mod runtime;
pub mod target;
pub mod watcher;

pub use config::{HotReloadConfig, ProbeConfig, Settings};
pub use expand::{expand, expand_deep};
pub use probe::{HealthCheck, HttpHealthCheck, ProbeError, ProbeOptions, ReadinessProbe};
pub use runtime::{ExtensionResolver, ExtensionSet, ExtensionTable, RuntimeOverrides, resolve};
pub use target::{WatchTarget, WatchTargetConfig, build_targets};
pub use watcher::{ChangeEvent, ChangeReceiver, HotReloadWatcher, WatchError, WatcherState};
