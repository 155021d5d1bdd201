//! Spawnset commands

use anyhow::{Context, Result};
use clap::Subcommand;
use dagger_core::spawnset::{DefaultRules, SpawnsView, SpawnsetBinary};
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum SpawnsetAction {
    /// Show settings and the spawn schedule
    Info {
        /// Spawnset file
        file: PathBuf,

        /// Number of loop waves to expand after the pre-loop spawns
        #[arg(short, long, default_value = "0")]
        waves: usize,
    },

    /// Print the MD5 of the spawnset as written
    Hash {
        /// Spawnset file
        file: PathBuf,
    },
}

pub fn execute(action: SpawnsetAction) -> Result<()> {
    match action {
        SpawnsetAction::Info { file, waves } => info(&file, waves),
        SpawnsetAction::Hash { file } => {
            let spawnset = load(&file)?;
            println!("{}", spawnset.hash());
            Ok(())
        }
    }
}

fn load(path: &Path) -> Result<SpawnsetBinary> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read spawnset: {}", path.display()))?;
    SpawnsetBinary::parse(&data).with_context(|| format!("Invalid spawnset: {}", path.display()))
}

fn info(path: &Path, waves: usize) -> Result<()> {
    let spawnset = load(path)?;

    println!("Spawnset: {}", path.display());
    println!(
        "  Format: spawn v{} / world v{} ({} or later)",
        spawnset.spawn_version,
        spawnset.world_version,
        spawnset.supported_game_version()
    );
    println!("  Mode: {:?}", spawnset.game_mode);
    println!(
        "  Arena: {0}x{0}, shrink {1} -> {2} at {3}/s",
        spawnset.arena.dimension(),
        spawnset.shrink_start,
        spawnset.shrink_end,
        spawnset.shrink_rate
    );
    if spawnset.has_practice_fields() {
        println!(
            "  Practice: {:?}, +{} gems",
            spawnset.hand_level, spawnset.additional_gems
        );
    }
    if spawnset.has_timer_start() {
        println!("  Timer start: {:.4}", spawnset.timer_start);
    }

    let view = SpawnsView::new(&spawnset, &DefaultRules, waves);
    println!();
    println!("  {:>5}  {:>9}  {:<16} {:>5}", "#", "Seconds", "Enemy", "Gems");
    for entry in &view.pre_loop {
        print_entry(entry);
    }
    for (wave, entries) in view.waves.iter().enumerate() {
        println!("  -- wave {} --", wave + 1);
        for entry in entries {
            print_entry(entry);
        }
    }
    println!();
    println!("  Total no-farm gems: {}", view.total_no_farm_gems());

    Ok(())
}

fn print_entry(entry: &dagger_core::spawnset::SpawnEntry) {
    println!(
        "  {:>5}  {:>9.4}  {:<16} {:>5}",
        entry.index,
        entry.seconds,
        entry.enemy_type.name(),
        entry.no_farm_gems
    );
}
