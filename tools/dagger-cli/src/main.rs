//! Dagger CLI - Inspect Devil Daggers files
//!
//! # Commands
//!
//! - `dagger spawnset info|hash` - Spawnset summary and MD5
//! - `dagger replay info|hash|recompile` - Replay summary, content hash and re-encoding
//! - `dagger assets list` - Table of contents of `res/dd` or `res/audio`
//! - `dagger content check` - Validate the configured game installation
//!
//! # Usage
//!
//! ```bash
//! # Spawn times with three loop waves
//! dagger spawnset info dd/survival --waves 3
//!
//! # Rebuild a replay from its timeline
//! dagger replay recompile run.ddreplay -o rebuilt.ddreplay
//! ```
//!
//! Logging follows `RUST_LOG`, falling back to `[log] filter` in config.toml.

mod assets;
mod content;
mod replay;
mod spawnset;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dagger_core::Config;
use std::path::PathBuf;

/// Dagger CLI - Inspect Devil Daggers spawnsets, replays and assets
#[derive(Parser)]
#[command(name = "dagger")]
#[command(about = "Inspect Devil Daggers spawnsets, replays and assets")]
#[command(version)]
struct Cli {
    /// Config file (default: platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spawnset commands
    #[command(subcommand)]
    Spawnset(spawnset::SpawnsetAction),

    /// Replay commands
    #[command(subcommand)]
    Replay(replay::ReplayAction),

    /// Asset container commands
    #[command(subcommand)]
    Assets(assets::AssetsAction),

    /// Game installation commands
    #[command(subcommand)]
    Content(content::ContentAction),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::load(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter)),
        )
        .init();

    match cli.command {
        Commands::Spawnset(action) => spawnset::execute(action),
        Commands::Replay(action) => replay::execute(action),
        Commands::Assets(action) => assets::execute(action),
        Commands::Content(action) => content::execute(action, &config),
    }
}
