//! Replay commands
//!
//! Accepts local replays (`ddrpl.` header) and raw leaderboard event
//! streams. The format is detected from the first bytes.

use anyhow::{Context, Result};
use clap::Subcommand;
use dagger_core::replay::local::LOCAL_REPLAY_IDENTIFIER;
use dagger_core::replay::{EditorReplayModel, EventType, LocalReplayBinary, ReplayEventsData};
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum ReplayAction {
    /// Show header fields and per-kind event counts
    Info {
        /// Replay file
        file: PathBuf,
    },

    /// Print the content hash of the replay timeline
    Hash {
        /// Replay file
        file: PathBuf,
    },

    /// Decompose into a timeline and compile it back
    Recompile {
        /// Input replay file
        file: PathBuf,

        /// Output file (same format as the input)
        #[arg(short, long)]
        output: PathBuf,
    },
}

pub fn execute(action: ReplayAction) -> Result<()> {
    match action {
        ReplayAction::Info { file } => info(&file),
        ReplayAction::Hash { file } => {
            let loaded = load(&file)?;
            println!("{}", loaded.model.to_hash());
            Ok(())
        }
        ReplayAction::Recompile { file, output } => recompile(&file, &output),
    }
}

struct LoadedReplay {
    model: EditorReplayModel,
    is_local: bool,
}

fn load(path: &Path) -> Result<LoadedReplay> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read replay: {}", path.display()))?;

    if data.starts_with(LOCAL_REPLAY_IDENTIFIER) {
        let replay = LocalReplayBinary::parse(&data)
            .with_context(|| format!("Invalid local replay: {}", path.display()))?;
        Ok(LoadedReplay {
            model: EditorReplayModel::from_local_replay(&replay),
            is_local: true,
        })
    } else {
        let events = ReplayEventsData::parse(&data)
            .with_context(|| format!("Invalid replay event stream: {}", path.display()))?;
        Ok(LoadedReplay {
            model: EditorReplayModel::from_leaderboard_replay(0, String::new(), &events),
            is_local: false,
        })
    }
}

fn info(path: &Path) -> Result<()> {
    let loaded = load(path)?;
    let model = &loaded.model;

    println!("Replay: {}", path.display());
    if loaded.is_local {
        println!("  Player: {} ({})", model.username, model.player_id);
        println!("  Time: {:.4} (start {:.4})", model.time, model.start_time);
        println!(
            "  Gems: {}  Kills: {}  Daggers: {}/{}",
            model.gems, model.kills, model.daggers_hit, model.daggers_fired
        );
        println!("  Spawnset: {}", model.spawnset.hash());
    } else {
        println!("  Leaderboard event stream");
    }
    println!("  Ticks: {}", model.tick_count());
    println!("  Look speed: {}", model.look_speed());

    println!("  Events: {}", model.event_count());
    for kind in EventType::COLLECTIONS {
        let count = model.events(kind)?.len();
        if count > 0 {
            println!("  {kind}: {count}");
        }
    }

    Ok(())
}

fn recompile(input: &Path, output: &Path) -> Result<()> {
    let loaded = load(input)?;

    let bytes = if loaded.is_local {
        loaded.model.to_local_replay().to_bytes()?
    } else {
        loaded.model.compiled().to_bytes()?
    };
    std::fs::write(output, &bytes).with_context(|| format!("Failed to write replay: {}", output.display()))?;

    tracing::info!(
        ticks = loaded.model.tick_count(),
        bytes = bytes.len(),
        "Recompiled {} -> {}",
        input.display(),
        output.display()
    );
    Ok(())
}
