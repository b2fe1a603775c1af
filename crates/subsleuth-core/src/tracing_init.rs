//! Tracing/logging initialization.
//!
//! The TUI owns the terminal, so log lines go to a file in the cache
//! directory instead of stderr.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::Result;

/// Log file name inside the cache directory.
pub const LOG_FILE: &str = "subsleuth.log";

/// Default filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "subsleuth=info,subsleuth_cli=info,subsleuth_core=info";

/// Initialise the global tracing subscriber, appending to `log_path`.
///
/// * `default_filter` -- default `RUST_LOG` value when the env-var is not set.
/// * `log_json` -- when `true`, emit structured JSON log lines instead of the
///   human-readable format.
pub fn init_tracing(default_filter: &str, log_path: &Path, log_json: bool) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    let writer = Mutex::new(file);

    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
    );
    if log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer),
            )
            .init();
    }
    Ok(())
}
