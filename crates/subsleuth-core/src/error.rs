//! Error types for `SubSleuth` core library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using `SubSleuth` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `SubSleuth` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Neither the override path nor the default install path points at a binary
    #[error("twitch CLI not found (set EVENTSUB_TWITCH_CLI_PATH or install to {default})")]
    ToolNotFound { default: PathBuf },

    /// The twitch CLI could not be started or exited abnormally
    #[error("twitch CLI `{command}` failed: {reason}")]
    ToolExecution { command: String, reason: String },

    /// Cache directory could not be resolved or created
    #[error("Cache directory error: {0}")]
    CacheDir(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
