//! Adapter around the external `twitch` CLI.
//!
//! All upstream data comes from shelling out to the CLI. Calls are blocking,
//! one-shot and never retried.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, error, warn};

use crate::error::{Error, Result};

/// Well-known install location used when no override is configured.
pub const DEFAULT_TWITCH_CLI_PATH: &str = "/usr/local/bin/twitch";

/// Environment variable holding an explicit path to the twitch CLI.
pub const TWITCH_CLI_PATH_ENV: &str = "EVENTSUB_TWITCH_CLI_PATH";

/// Capability to run the external CLI and collect its output.
///
/// The real implementation is [`TwitchCli`]; tests substitute fakes that
/// return canned bytes.
pub trait CliRunner {
    fn run(&self, args: &[String]) -> Result<Vec<u8>>;
}

impl<T: CliRunner + ?Sized> CliRunner for &T {
    fn run(&self, args: &[String]) -> Result<Vec<u8>> {
        (**self).run(args)
    }
}

/// Arguments listing every EventSub subscription.
pub fn subscriptions_args() -> Vec<String> {
    ["api", "get", "-P", "eventsub/subscriptions"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Arguments looking up users by id, one `-q id=<id>` pair per id.
pub fn users_args<S: AsRef<str>>(ids: &[S]) -> Vec<String> {
    let mut args: Vec<String> = ["api", "get", "users"]
        .iter()
        .map(ToString::to_string)
        .collect();
    for id in ids {
        args.push("-q".to_string());
        args.push(format!("id={}", id.as_ref()));
    }
    args
}

/// The real twitch CLI, resolved on every invocation.
#[derive(Debug, Clone)]
pub struct TwitchCli {
    override_path: Option<PathBuf>,
    default_path: PathBuf,
    config_dir: Option<PathBuf>,
}

impl Default for TwitchCli {
    fn default() -> Self {
        Self {
            override_path: None,
            default_path: PathBuf::from(DEFAULT_TWITCH_CLI_PATH),
            config_dir: dirs::config_dir(),
        }
    }
}

impl TwitchCli {
    /// Create an adapter. `override_path` wins over the default install path.
    pub fn new(override_path: Option<PathBuf>) -> Self {
        Self {
            override_path,
            ..Self::default()
        }
    }

    /// Replace the fallback install path.
    #[must_use]
    pub fn with_default_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_path = path.into();
        self
    }

    /// Replace the user config directory searched for the CLI's env file.
    #[must_use]
    pub fn with_config_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.config_dir = dir;
        self
    }

    /// Path of the credentials file written by `twitch configure`/`twitch login`.
    pub fn config_file(&self) -> Option<PathBuf> {
        self.config_dir
            .as_ref()
            .map(|d| d.join("twitch-cli").join(".twitch-cli.env"))
    }

    /// Resolve the executable: override first, then the default install path.
    pub fn resolve_binary(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.override_path {
            debug!(path = %path.display(), "using twitch CLI override");
            return Ok(path.clone());
        }
        if self.default_path.is_file() {
            debug!(path = %self.default_path.display(), "twitch CLI found");
            return Ok(self.default_path.clone());
        }
        error!(default = %self.default_path.display(), "twitch CLI not found");
        Err(Error::ToolNotFound {
            default: self.default_path.clone(),
        })
    }

    /// Warn when the CLI has never been configured. Never fails.
    fn check_configured(&self) -> bool {
        match self.config_file() {
            Some(ref path) if path.exists() => {
                debug!("twitch CLI seems configured");
                true
            }
            path => {
                warn!(
                    path = ?path,
                    "twitch CLI config not found, run `twitch login` to set up the twitch CLI"
                );
                false
            }
        }
    }
}

impl CliRunner for TwitchCli {
    fn run(&self, args: &[String]) -> Result<Vec<u8>> {
        let binary = self.resolve_binary()?;
        self.check_configured();
        execute(&binary, args)
    }
}

/// Run `binary` and return stdout followed by stderr.
fn execute(binary: &Path, args: &[String]) -> Result<Vec<u8>> {
    let cmd_line = format!("{} {}", binary.display(), args.join(" "));
    debug!("exec: {cmd_line}");

    let output = Command::new(binary)
        .args(args)
        .output()
        .map_err(|e| {
            error!(%e, "failed to run twitch CLI");
            Error::ToolExecution {
                command: cmd_line.clone(),
                reason: e.to_string(),
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!(status = %output.status, "twitch CLI failed: {cmd_line}\nstderr: {stderr}");
        return Err(Error::ToolExecution {
            command: cmd_line,
            reason: format!("{}: {}", output.status, stderr.trim()),
        });
    }

    let mut combined = output.stdout;
    combined.extend_from_slice(&output.stderr);
    debug!(bytes = combined.len(), "twitch CLI returned");
    Ok(combined)
}
