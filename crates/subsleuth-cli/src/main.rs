//! `SubSleuth` CLI
//!
//! Terminal viewer for Twitch EventSub subscriptions. Data comes from the
//! `twitch` CLI and is cached under the user cache directory.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use subsleuth_cli::app::{App, build_rows};
use subsleuth_cli::tui;
use subsleuth_core::config::{Config, load_config};
use subsleuth_core::tracing_init::{DEFAULT_FILTER, LOG_FILE, init_tracing};
use subsleuth_core::{Cache, TwitchCli};

#[derive(Parser, Debug)]
#[command(name = "subsleuth")]
#[command(version, about = "Browse Twitch EventSub subscriptions in the terminal", long_about = None)]
struct Cli {
    /// Maximum visible table rows, also the PageUp/PageDown step
    #[arg(short = 'n', long)]
    entries: Option<usize>,

    /// Cache directory (defaults to <user cache dir>/subsleuth)
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config()?;
    if let Some(n) = cli.entries {
        config.entries = n;
    }
    if cli.cache_dir.is_some() {
        config.cache_dir = cli.cache_dir;
    }

    let cache_dir = config.resolved_cache_dir()?;
    std::fs::create_dir_all(&cache_dir)
        .with_context(|| format!("failed to create cache directory {}", cache_dir.display()))?;
    init_tracing(DEFAULT_FILTER, &cache_dir.join(LOG_FILE), config.log_json)
        .context("could not create log file")?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting subsleuth");

    let result = run(&config, cache_dir);
    if let Err(ref e) = result {
        error!("{e:#}");
    }
    result
}

fn run(config: &Config, cache_dir: PathBuf) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut cache = Cache::open(cache_dir, TwitchCli::new(config.twitch_cli_path.clone()))?;
    cache
        .ensure_subscriptions_cached()
        .context("failed to download subscriptions")?;
    cache.load_users();
    info!(users = cache.users().len(), "users loaded");
    info!(elapsed = ?start.elapsed(), "cache loaded");

    let snapshot = cache
        .load_snapshot()
        .with_context(|| {
            format!(
                "failed to load event subscriptions from {}",
                cache.subscriptions_path().display()
            )
        })?;
    info!(count = snapshot.data.len(), "event subscriptions loaded");

    let rows = build_rows(&snapshot, |id| cache.resolve_display_name(id));
    info!(rows = rows.len(), "table built");

    let mut app = App::new(rows, config.entries);
    tui::run(&mut app)
}
