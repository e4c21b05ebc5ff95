//! Watch target construction.
//!
//! Turns raw [`WatchTargetConfig`] entries into [`WatchTarget`]s: placeholders
//! expanded, `local_path` made absolute against the project root, and the
//! extension filter resolved. One target per config entry; two functions
//! pointing at the same directory both get a target. Path-level deduplication
//! happens in the watcher.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::expand::expand_with;
use crate::runtime::{ExtensionResolver, ExtensionSet, normalize_extensions};

/// A function's watch declaration as it appears in configuration.
///
/// Every string except `file_extensions` may carry `${NAME}`/`$NAME`
/// placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchTargetConfig {
    #[serde(alias = "functionName")]
    pub function_name: String,

    #[serde(alias = "localPath")]
    pub local_path: String,

    #[serde(default)]
    pub handler: String,

    #[serde(default)]
    pub runtime: String,

    /// Explicit extension filter; skips runtime resolution when set.
    #[serde(
        default,
        alias = "fileExtensions",
        skip_serializing_if = "Option::is_none"
    )]
    pub file_extensions: Option<Vec<String>>,
}

/// A fully resolved, watchable function directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchTarget {
    pub function_name: String,
    /// Always absolute.
    pub local_path: PathBuf,
    pub handler: String,
    /// As configured, unexpanded.
    pub runtime: String,
    /// Never empty.
    pub file_extensions: ExtensionSet,
}

impl WatchTarget {
    /// Whether `path` carries one of this target's extensions.
    pub fn matches(&self, path: &Path) -> bool {
        file_extension(path).is_some_and(|ext| self.file_extensions.contains(&ext))
    }
}

/// Lowercased extension of `path` with a leading `.`.
///
/// Dotfiles such as `.env` have no extension.
pub fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext.to_lowercase()))
}

/// Build targets, expanding placeholders from the process environment.
pub fn build_targets(
    configs: &[WatchTargetConfig],
    project_root: &Path,
    resolver: &ExtensionResolver,
) -> Vec<WatchTarget> {
    build_targets_with(configs, project_root, resolver, |name| {
        std::env::var(name).ok()
    })
}

/// Build targets with a caller-supplied placeholder lookup.
pub fn build_targets_with<F>(
    configs: &[WatchTargetConfig],
    project_root: &Path,
    resolver: &ExtensionResolver,
    lookup: F,
) -> Vec<WatchTarget>
where
    F: Fn(&str) -> Option<String>,
{
    configs
        .iter()
        .map(|config| build_target(config, project_root, resolver, &lookup))
        .collect()
}

fn build_target<F>(
    config: &WatchTargetConfig,
    project_root: &Path,
    resolver: &ExtensionResolver,
    lookup: &F,
) -> WatchTarget
where
    F: Fn(&str) -> Option<String>,
{
    let function_name = expand_with(&config.function_name, lookup);
    let handler = expand_with(&config.handler, lookup);
    let local_path = resolve_local_path(&expand_with(&config.local_path, lookup), project_root);

    let file_extensions = config
        .file_extensions
        .as_deref()
        .map(|exts| normalize_extensions(exts))
        .filter(|exts| !exts.is_empty())
        .unwrap_or_else(|| resolver.resolve(&config.runtime));

    crate::debug_event!(
        "targets",
        "resolved",
        "{function_name} -> {} [{}]",
        local_path.display(),
        file_extensions.iter().cloned().collect::<Vec<_>>().join(", ")
    );

    WatchTarget {
        function_name,
        local_path,
        handler,
        runtime: config.runtime.clone(),
        file_extensions,
    }
}

/// Make `raw` absolute against `project_root` and drop `.`/`..` components.
pub fn resolve_local_path(raw: &str, project_root: &Path) -> PathBuf {
    let path = Path::new(raw);
    let joined = if path.is_relative() {
        project_root.join(path)
    } else {
        path.to_path_buf()
    };
    normalize_lexically(&joined)
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
