//! Configuration module for the hot-reload watcher.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file (`.lambda-reload/settings.toml`)
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `LR_` and use double underscores
//! to separate nested levels:
//! - `LR_HOT_RELOAD__WATCH_INTERVAL_MS=300` sets `hot_reload.watch_interval_ms`
//! - `LR_PROBE__PORT=4566` sets `probe.port`
//! - `LR_HOT_RELOAD__ENABLED=false` sets `hot_reload.enabled`
//!
//! Placeholders inside `hot_reload.lambda_paths` (`${STAGE}`, `$HOME`) are not
//! touched at load time; they are expanded when the watcher builds its targets.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::runtime::{ExtensionResolver, RuntimeOverrides};
use crate::target::WatchTargetConfig;

/// Directory holding the settings file.
pub const CONFIG_DIR: &str = ".lambda-reload";

/// Settings file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "settings.toml";

/// Errors from loading or saving settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Configuration file already exists at {path}. Use --force to overwrite")]
    AlreadyExists { path: PathBuf },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    /// Root that relative `local_path` entries resolve against.
    /// Defaults to the directory holding `.lambda-reload`, else the current directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_root: Option<PathBuf>,

    /// Hot-reload watcher settings
    #[serde(default)]
    pub hot_reload: HotReloadConfig,

    /// Emulator readiness probe settings
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Shape owned by the orchestrator: `{enabled, watchIntervalMs, lambdaPaths, ...}`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HotReloadConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Minimum time between two accepted changes for one watched directory.
    #[serde(default = "default_watch_interval_ms", alias = "watchIntervalMs")]
    pub watch_interval_ms: u64,

    #[serde(default, alias = "lambdaPaths")]
    pub lambda_paths: Vec<WatchTargetConfig>,

    /// Runtime key -> extensions, layered over the built-in table.
    #[serde(default, alias = "runtimeFileExtensions")]
    pub runtime_file_extensions: RuntimeOverrides,

    /// Replaces the built-in fallback set for unmatched runtimes.
    #[serde(
        default,
        alias = "defaultFileExtensions",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_file_extensions: Option<Vec<String>>,

    /// Capacity of the change event channel. Events beyond it are dropped.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProbeConfig {
    #[serde(default = "default_probe_host")]
    pub host: String,

    #[serde(default = "default_probe_port")]
    pub port: u16,

    #[serde(default = "default_health_path")]
    pub health_path: String,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Per-attempt request timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level for all modules
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module overrides, e.g. `lambda_reload::watcher = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_true() -> bool {
    true
}
fn default_watch_interval_ms() -> u64 {
    700
}
fn default_event_buffer() -> usize {
    256
}
fn default_probe_host() -> String {
    "127.0.0.1".to_string()
}
fn default_probe_port() -> u16 {
    4566
}
fn default_health_path() -> String {
    "/_localstack/health".to_string()
}
fn default_max_attempts() -> u32 {
    30
}
fn default_retry_delay_ms() -> u64 {
    2000
}
fn default_timeout_ms() -> u64 {
    5000
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for HotReloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            watch_interval_ms: default_watch_interval_ms(),
            lambda_paths: Vec::new(),
            runtime_file_extensions: RuntimeOverrides::new(),
            default_file_extensions: None,
            event_buffer: default_event_buffer(),
        }
    }
}

impl HotReloadConfig {
    /// The debounce interval; zero falls back to the default.
    pub fn watch_interval(&self) -> Duration {
        match self.watch_interval_ms {
            0 => Duration::from_millis(default_watch_interval_ms()),
            ms => Duration::from_millis(ms),
        }
    }

    /// Resolver built from the configured overrides and fallback set.
    pub fn extension_resolver(&self) -> ExtensionResolver {
        ExtensionResolver::new(
            &self.runtime_file_extensions,
            self.default_file_extensions.as_deref(),
        )
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            host: default_probe_host(),
            port: default_probe_port(),
            health_path: default_health_path(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));

        let mut settings = Self::figment(&config_path).extract::<Settings>().map_err(Box::new)?;

        if settings.project_root.is_none() {
            settings.project_root = Self::workspace_root();
        }
        Ok(settings)
    }

    /// Load configuration from a specific file
    ///
    /// Without an explicit `project_root`, relative paths resolve against the
    /// directory holding `.lambda-reload`, or the file's own directory.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut settings = Self::figment(path)
            .extract::<Settings>()
            .map_err(Box::new)?;

        if settings.project_root.is_none() {
            settings.project_root = Self::root_for_config(path);
        }
        Ok(settings)
    }

    // Defaults come from the serde attributes rather than a serialized
    // layer, so camelCase keys in the file never collide with default keys.
    fn figment(config_path: &Path) -> Figment {
        Figment::new()
            // Layer in config file if it exists
            .merge(Toml::file(config_path))
            // Double underscore separates nested levels
            .merge(Env::prefixed("LR_").split("__"))
    }

    /// Resolved project root, falling back to the current directory.
    pub fn project_root(&self) -> PathBuf {
        self.project_root
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn root_for_config(config_path: &Path) -> Option<PathBuf> {
        let config_path = if config_path.is_absolute() {
            config_path.to_path_buf()
        } else {
            std::env::current_dir().ok()?.join(config_path)
        };

        let dir = config_path.parent()?;
        if dir.file_name().is_some_and(|name| name == CONFIG_DIR) {
            dir.parent().map(Path::to_path_buf)
        } else {
            Some(dir.to_path_buf())
        }
    }

    /// Find `.lambda-reload/settings.toml` searching from the current directory up.
    fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// The nearest ancestor of the current directory holding `.lambda-reload`.
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Create a default settings file in the current directory
    pub fn init_config_file(force: bool) -> Result<PathBuf, ConfigError> {
        let config_path = PathBuf::from(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err(ConfigError::AlreadyExists { path: config_path });
        }

        Settings::default().save(&config_path)?;
        Ok(config_path)
    }
}
