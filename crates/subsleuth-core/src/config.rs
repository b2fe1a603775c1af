//! Configuration resolution for `SubSleuth`.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (`<config dir>/subsleuth/settings.json`)
//! 3. Environment variables
//! 4. CLI arguments (applied by the binary, highest priority)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::twitch::TWITCH_CLI_PATH_ENV;

/// Application name used to namespace cache and config directories.
pub const APP_NAME: &str = "subsleuth";

/// Default number of table rows moved by a page step.
pub const DEFAULT_ENTRIES: usize = 15;

/// Complete `SubSleuth` configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Overrides `<cache dir>/subsleuth`.
    pub cache_dir: Option<PathBuf>,
    /// Overrides the default twitch CLI install path.
    pub twitch_cli_path: Option<PathBuf>,
    /// Table rows per page step.
    pub entries: usize,
    /// Emit JSON log lines instead of the human-readable format.
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: None,
            twitch_cli_path: None,
            entries: DEFAULT_ENTRIES,
            log_json: false,
        }
    }
}

impl Config {
    /// Directory holding `subs.json`, `users.json` and the log file.
    pub fn resolved_cache_dir(&self) -> Result<PathBuf> {
        self.cache_dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|d| d.join(APP_NAME)))
            .ok_or_else(|| Error::CacheDir("cannot determine user cache directory".into()))
    }
}

/// Load configuration from the global file and the process environment.
pub fn load_config() -> Result<Config> {
    load_config_with(global_config_path().as_deref(), |key| std::env::var(key).ok())
}

/// Load configuration from an optional settings file and an env lookup.
pub fn load_config_with(
    settings: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Config> {
    let mut config = match settings {
        Some(path) if path.exists() => load_config_file(path)?,
        _ => Config::default(),
    };
    apply_env_overrides(&mut config, env);
    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME).join("settings.json"))
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn apply_env_overrides(config: &mut Config, env: impl Fn(&str) -> Option<String>) {
    if let Some(val) = env("SUBSLEUTH_CACHE_DIR").filter(|v| !v.is_empty()) {
        config.cache_dir = Some(PathBuf::from(val));
    }
    if let Some(val) = env(TWITCH_CLI_PATH_ENV).filter(|v| !v.is_empty()) {
        config.twitch_cli_path = Some(PathBuf::from(val));
    }
    if let Some(val) = env("SUBSLEUTH_ENTRIES") {
        if let Ok(n) = val.parse() {
            config.entries = n;
        }
    }
    if let Some(val) = env("SUBSLEUTH_LOG_JSON") {
        config.log_json = matches!(val.as_str(), "1" | "true" | "yes");
    }
}
