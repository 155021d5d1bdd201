//! Spawnsets: level configuration files
//!
//! - [`SpawnsetBinary`] parses and writes the binary format
//! - [`SpawnsView`] derives spawn times, waves and gem counts
//! - [`SpawnsetEditor`] applies [`SpawnsetCommand`]s with undo/redo

pub mod binary;
pub mod history;
pub mod types;
pub mod view;

pub use binary::{Arena, SpawnsetBinary};
pub use history::{
    HistoryEntry, HistoryError, MAX_HISTORY_ENTRIES, MAX_SPAWNS, SpawnsetCommand, SpawnsetEditor,
    SpawnsetHistory,
};
pub use types::{EnemyType, GameMode, GameVersion, HandLevel, Spawn};
pub use view::{DefaultRules, GameRules, GemState, SpawnEntry, SpawnsView};

use dagger_shared::FormatError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpawnsetError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("invalid game mode {0}")]
    InvalidGameMode(i32),

    #[error("invalid hand level {0}")]
    InvalidHandLevel(u8),

    #[error("invalid enemy type {value} for spawn {index}")]
    InvalidEnemyType { index: usize, value: i32 },

    #[error("arena dimension cannot be negative ({0})")]
    NegativeArenaDimension(i32),

    #[error("spawn count cannot be negative ({0})")]
    NegativeSpawnCount(i32),

    #[error("unsupported {field} {value} (supported: {min}-{max})")]
    UnsupportedVersion {
        field: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },

    #[error("spawn index {index} is out of range ({len} spawns)")]
    SpawnIndexOutOfRange { index: usize, len: usize },

    #[error("too many spawns ({count}, maximum is {max})")]
    TooManySpawns { count: usize, max: usize },

    #[error("arena tile ({x}, {z}) is outside the {dimension}x{dimension} arena")]
    TileOutOfRange { x: usize, z: usize, dimension: usize },
}
