//! Game installation commands

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use dagger_core::{Config, GameContent};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum ContentAction {
    /// Validate an installation and load the preview content
    Check {
        /// Installation directory (default: `[game] installation_directory` from config)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

pub fn execute(action: ContentAction, config: &Config) -> Result<()> {
    match action {
        ContentAction::Check { dir } => check(dir, config),
    }
}

fn check(dir: Option<PathBuf>, config: &Config) -> Result<()> {
    let Some(dir) = dir.or_else(|| config.game.installation_directory.clone()) else {
        bail!("No installation directory given and none configured");
    };

    let expected = config
        .game
        .survival_hash()
        .context("Invalid survival_md5 in config")?;

    let content =
        GameContent::load(&dir, expected).with_context(|| format!("Invalid installation: {}", dir.display()))?;

    let survival = &content.default_spawnset;
    println!("Installation OK: {}", dir.display());
    println!(
        "  Survival: {} spawns, arena {1}x{1}, {2}",
        survival.spawns.len(),
        survival.arena.dimension(),
        survival.hash()
    );
    println!(
        "  Dagger mesh: {} vertices",
        content.dagger_mesh.vertices.len()
    );
    println!(
        "  Tile texture: {}x{}",
        content.tile_texture.width, content.tile_texture.height
    );
    println!(
        "  Jump sound: {:.2}s",
        content.sound_jump1.duration_secs()
    );

    Ok(())
}
