//! Runtime identifier to watched file extensions.
//!
//! Resolution walks three tiers against the effective table (built-in
//! defaults with caller overrides on top):
//!
//! 1. exact key (`python3.13`)
//! 2. base version, the text before the first `.` (`python3`)
//! 3. family, the base version without trailing digits (`python`)
//!
//! Anything left unmatched resolves to the default extension set. Matching is
//! case-sensitive; runtime identifiers are opaque tokens.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};

/// Ordered set of lowercase extensions, each with a leading `.`.
pub type ExtensionSet = IndexSet<String>;

/// Caller-supplied runtime overrides, as they appear in configuration.
pub type RuntimeOverrides = HashMap<String, Vec<String>>;

/// Built-in runtime table. Extend by adding rows.
const BUILTIN_RUNTIMES: &[(&str, &[&str])] = &[
    ("python", &[".py"]),
    ("ruby", &[".rb"]),
    ("nodejs", &[".js", ".mjs", ".cjs", ".ts", ".mts", ".cts", ".json"]),
    ("java", &[".java", ".class", ".jar", ".kt", ".groovy"]),
    ("dotnet", &[".cs", ".fs", ".vb", ".dll", ".csproj"]),
    ("go", &[".go"]),
    ("provided", &[".go", ".rs"]),
    ("rust", &[".rs"]),
];

/// Used when nothing in the table matches.
const BUILTIN_DEFAULT_EXTENSIONS: &[&str] = &[".py", ".js", ".ts", ".java", ".cs", ".go", ".rb"];

/// Normalize a configured extension: trim, lowercase, ensure leading `.`.
///
/// Returns `None` for blank entries.
pub fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}

/// Normalize a list of configured extensions into an ordered set.
pub fn normalize_extensions<S: AsRef<str>>(raw: &[S]) -> ExtensionSet {
    raw.iter()
        .filter_map(|ext| normalize_extension(ext.as_ref()))
        .collect()
}

/// The built-in default extension set.
pub fn default_extensions() -> ExtensionSet {
    normalize_extensions(BUILTIN_DEFAULT_EXTENSIONS)
}

/// Runtime to extension mapping.
#[derive(Debug, Clone)]
pub struct ExtensionTable {
    entries: IndexMap<String, ExtensionSet>,
}

impl ExtensionTable {
    /// The built-in table.
    pub fn builtin() -> Self {
        let entries = BUILTIN_RUNTIMES
            .iter()
            .map(|&(runtime, exts)| (runtime.to_string(), normalize_extensions(exts)))
            .collect();
        Self { entries }
    }

    /// Built-in table with `overrides` applied on top.
    ///
    /// An override replaces the default entry for the identical key; other
    /// defaults are kept.
    pub fn with_overrides(overrides: &RuntimeOverrides) -> Self {
        let mut table = Self::builtin();
        for (runtime, exts) in overrides {
            table
                .entries
                .insert(runtime.clone(), normalize_extensions(exts));
        }
        table
    }

    /// Exact key lookup.
    pub fn get(&self, runtime: &str) -> Option<&ExtensionSet> {
        self.entries.get(runtime)
    }

    /// Walk the exact, base-version and family tiers.
    pub fn lookup(&self, runtime: &str) -> Option<&ExtensionSet> {
        if let Some(exts) = self.get(runtime) {
            return Some(exts);
        }

        let base = base_version(runtime);
        if let Some(exts) = self.get(base) {
            return Some(exts);
        }

        self.get(family(base))
    }
}

impl Default for ExtensionTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Text before the first `.`.
fn base_version(runtime: &str) -> &str {
    runtime.split_once('.').map_or(runtime, |(base, _)| base)
}

/// Base version with trailing ASCII digits removed.
fn family(base: &str) -> &str {
    base.trim_end_matches(|c: char| c.is_ascii_digit())
}

/// Resolves runtimes against a fixed table and fallback set.
///
/// Built once per watcher start from settings.
#[derive(Debug, Clone)]
pub struct ExtensionResolver {
    table: ExtensionTable,
    fallback: ExtensionSet,
}

impl ExtensionResolver {
    pub fn new(overrides: &RuntimeOverrides, fallback: Option<&[String]>) -> Self {
        let fallback = fallback
            .map(|exts| normalize_extensions(exts))
            .filter(|set| !set.is_empty())
            .unwrap_or_else(default_extensions);

        Self {
            table: ExtensionTable::with_overrides(overrides),
            fallback,
        }
    }

    /// Resolve `runtime`, never returning an empty set.
    pub fn resolve(&self, runtime: &str) -> ExtensionSet {
        match self.table.lookup(runtime) {
            Some(exts) if !exts.is_empty() => exts.clone(),
            _ => self.fallback.clone(),
        }
    }
}

impl Default for ExtensionResolver {
    fn default() -> Self {
        Self::new(&RuntimeOverrides::new(), None)
    }
}

/// Resolve `runtime` against the built-in table plus optional overrides.
pub fn resolve(runtime: &str, overrides: Option<&RuntimeOverrides>) -> ExtensionSet {
    match overrides {
        Some(overrides) => ExtensionResolver::new(overrides, None).resolve(runtime),
        None => ExtensionResolver::default().resolve(runtime),
    }
}
