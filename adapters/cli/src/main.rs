#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless survival session.

mod arena;
mod clock;
mod config;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{ModeSetting, SessionConfig},
    session::Session,
};

/// Runs wave spawning and population dispatch without a renderer.
#[derive(Debug, Parser)]
#[command(name = "horde", version, about)]
struct Cli {
    /// Session configuration file in TOML format.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of waves to play.
    #[arg(short, long)]
    waves: Option<u32>,
    /// Seed for every random draw in the session.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Simulated seconds between consecutive waves.
    #[arg(long)]
    wave_seconds: Option<f32>,
    /// Planner strategy.
    #[arg(short, long, value_enum)]
    mode: Option<ModeSetting>,
    /// Log debug output unless `RUST_LOG` says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn session_config(&self) -> Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::load(path)?,
            None => SessionConfig::default(),
        };

        if let Some(waves) = self.waves {
            config.waves = waves;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(wave_seconds) = self.wave_seconds {
            config.wave_seconds = wave_seconds;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Entry point for the horde command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.session_config()?;
    tracing::info!(
        mode = ?config.mode,
        waves = config.waves,
        seed = config.seed,
        "starting session"
    );

    let summary = Session::new(&config)
        .context("failed to build wave planner from session config")?
        .run();

    tracing::info!(
        waves = summary.waves,
        frames = summary.frames,
        spawned = summary.spawned,
        created = summary.arena.created,
        spawned_in_view = summary.spawned_in_view,
        declined = summary.arena.declined,
        alive = summary.alive,
        removed = summary.removed,
        departed = summary.departed,
        expired = summary.arena.expired,
        reached_player = summary.arena.reached_player,
        collected = summary.arena.collected,
        "session finished"
    );
    Ok(())
}
