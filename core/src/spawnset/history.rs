//! Spawnset editing with undo/redo
//!
//! Edits are [`SpawnsetCommand`] values applied to an owned document. After
//! every applied command the serialized spawnset is pushed onto a bounded
//! history; a command that leaves the bytes unchanged is not recorded.

use super::binary::SpawnsetBinary;
use super::types::{GameMode, HandLevel, Spawn};
use super::SpawnsetError;
use dagger_shared::ContentHash;
use glam::Vec2;

/// Maximum number of snapshots kept
pub const MAX_HISTORY_ENTRIES: usize = 100;

/// Maximum number of spawns a spawnset may hold
pub const MAX_SPAWNS: usize = 4096;

pub const SUPPORTED_WORLD_VERSIONS: std::ops::RangeInclusive<i32> = 8..=9;
pub const SUPPORTED_SPAWN_VERSIONS: std::ops::RangeInclusive<i32> = 4..=6;

#[derive(Debug, Clone, PartialEq)]
pub enum SpawnsetCommand {
    SetWorldVersion(i32),
    SetSpawnVersion(i32),
    SetGameMode(GameMode),
    SetShrink { start: f32, end: f32, rate: f32 },
    SetBrightness(f32),
    SetRaceDaggerPosition(Vec2),
    SetHandLevel(HandLevel),
    SetAdditionalGems(i32),
    SetTimerStart(f32),
    SetArenaTile { x: usize, z: usize, height: f32 },
    InsertSpawns { index: usize, spawns: Vec<Spawn> },
    ReplaceSpawn { index: usize, spawn: Spawn },
    /// Remove the spawns at the given indices
    RemoveSpawns(Vec<usize>),
    ClearSpawns,
}

impl SpawnsetCommand {
    /// Short description stored with the history entry
    pub fn label(&self) -> &'static str {
        match self {
            Self::SetWorldVersion(_) => "World version",
            Self::SetSpawnVersion(_) => "Spawn version",
            Self::SetGameMode(_) => "Game mode",
            Self::SetShrink { .. } => "Shrink",
            Self::SetBrightness(_) => "Brightness",
            Self::SetRaceDaggerPosition(_) => "Race dagger position",
            Self::SetHandLevel(_) => "Hand level",
            Self::SetAdditionalGems(_) => "Additional gems",
            Self::SetTimerStart(_) => "Timer start",
            Self::SetArenaTile { .. } => "Arena tile",
            Self::InsertSpawns { .. } => "Spawns added",
            Self::ReplaceSpawn { .. } => "Spawn edited",
            Self::RemoveSpawns(_) => "Spawns deleted",
            Self::ClearSpawns => "Spawns cleared",
        }
    }

    pub fn apply(&self, spawnset: &mut SpawnsetBinary) -> Result<(), SpawnsetError> {
        match self {
            Self::SetWorldVersion(v) => {
                check_version("world_version", *v, SUPPORTED_WORLD_VERSIONS)?;
                spawnset.world_version = *v;
            }
            Self::SetSpawnVersion(v) => {
                check_version("spawn_version", *v, SUPPORTED_SPAWN_VERSIONS)?;
                spawnset.spawn_version = *v;
            }
            Self::SetGameMode(mode) => spawnset.game_mode = *mode,
            Self::SetShrink { start, end, rate } => {
                spawnset.shrink_start = *start;
                spawnset.shrink_end = *end;
                spawnset.shrink_rate = *rate;
            }
            Self::SetBrightness(b) => spawnset.brightness = *b,
            Self::SetRaceDaggerPosition(p) => spawnset.race_dagger_position = *p,
            Self::SetHandLevel(level) => spawnset.hand_level = *level,
            Self::SetAdditionalGems(gems) => spawnset.additional_gems = *gems,
            Self::SetTimerStart(t) => spawnset.timer_start = *t,
            Self::SetArenaTile { x, z, height } => {
                if !spawnset.arena.set(*x, *z, *height) {
                    return Err(SpawnsetError::TileOutOfRange {
                        x: *x,
                        z: *z,
                        dimension: spawnset.arena.dimension(),
                    });
                }
            }
            Self::InsertSpawns { index, spawns } => {
                let len = spawnset.spawns.len();
                if *index > len {
                    return Err(SpawnsetError::SpawnIndexOutOfRange { index: *index, len });
                }
                if len + spawns.len() > MAX_SPAWNS {
                    return Err(SpawnsetError::TooManySpawns {
                        count: len + spawns.len(),
                        max: MAX_SPAWNS,
                    });
                }
                spawnset.spawns.splice(*index..*index, spawns.iter().copied());
            }
            Self::ReplaceSpawn { index, spawn } => {
                let len = spawnset.spawns.len();
                let slot = spawnset
                    .spawns
                    .get_mut(*index)
                    .ok_or(SpawnsetError::SpawnIndexOutOfRange { index: *index, len })?;
                *slot = *spawn;
            }
            Self::RemoveSpawns(indices) => {
                let len = spawnset.spawns.len();
                if let Some(&index) = indices.iter().find(|&&i| i >= len) {
                    return Err(SpawnsetError::SpawnIndexOutOfRange { index, len });
                }
                let mut index = 0;
                spawnset.spawns.retain(|_| {
                    let keep = !indices.contains(&index);
                    index += 1;
                    keep
                });
            }
            Self::ClearSpawns => spawnset.spawns.clear(),
        }
        Ok(())
    }
}

fn check_version(
    field: &'static str,
    value: i32,
    range: std::ops::RangeInclusive<i32>,
) -> Result<(), SpawnsetError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(SpawnsetError::UnsupportedVersion {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    #[error("history entry {index} could not be restored: {source}")]
    Snapshot {
        index: usize,
        #[source]
        source: SpawnsetError,
    },
}

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub bytes: Vec<u8>,
    pub hash: ContentHash,
    pub label: &'static str,
}

impl HistoryEntry {
    fn new(spawnset: &SpawnsetBinary, label: &'static str) -> Self {
        let bytes = spawnset.to_bytes();
        let hash = ContentHash::of(&bytes);
        Self { bytes, hash, label }
    }
}

/// Bounded list of serialized snapshots with a cursor
#[derive(Debug, Clone)]
pub struct SpawnsetHistory {
    entries: Vec<HistoryEntry>,
    current: usize,
}

impl SpawnsetHistory {
    pub fn new(initial: &SpawnsetBinary) -> Self {
        Self {
            entries: vec![HistoryEntry::new(initial, "Reset")],
            current: 0,
        }
    }

    /// Replace the whole history with a single entry
    pub fn reset(&mut self, spawnset: &SpawnsetBinary) {
        *self = Self::new(spawnset);
    }

    /// Record a snapshot. Returns false when the bytes match the current entry.
    pub fn save(&mut self, spawnset: &SpawnsetBinary, label: &'static str) -> bool {
        let entry = HistoryEntry::new(spawnset, label);
        if self.entries[self.current].hash == entry.hash {
            return false;
        }

        self.entries.truncate(self.current + 1);
        self.entries.push(entry);
        if self.entries.len() > MAX_HISTORY_ENTRIES {
            self.entries.remove(0);
        }
        self.current = self.entries.len() - 1;
        true
    }

    pub fn undo(&mut self) -> Result<SpawnsetBinary, HistoryError> {
        if self.current == 0 {
            return Err(HistoryError::NothingToUndo);
        }
        self.restore(self.current - 1)
    }

    pub fn redo(&mut self) -> Result<SpawnsetBinary, HistoryError> {
        if self.current + 1 >= self.entries.len() {
            return Err(HistoryError::NothingToRedo);
        }
        self.restore(self.current + 1)
    }

    fn restore(&mut self, index: usize) -> Result<SpawnsetBinary, HistoryError> {
        let spawnset = SpawnsetBinary::parse(&self.entries[index].bytes)
            .map_err(|source| HistoryError::Snapshot { index, source })?;
        self.current = index;
        Ok(spawnset)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.entries.len()
    }
}

/// Owned spawnset document with its edit history
#[derive(Debug, Clone)]
pub struct SpawnsetEditor {
    spawnset: SpawnsetBinary,
    history: SpawnsetHistory,
}

impl SpawnsetEditor {
    pub fn new(spawnset: SpawnsetBinary) -> Self {
        let history = SpawnsetHistory::new(&spawnset);
        Self { spawnset, history }
    }

    pub fn spawnset(&self) -> &SpawnsetBinary {
        &self.spawnset
    }

    pub fn history(&self) -> &SpawnsetHistory {
        &self.history
    }

    /// Apply a command. Returns whether it produced a new history entry.
    pub fn apply(&mut self, command: SpawnsetCommand) -> Result<bool, SpawnsetError> {
        let mut edited = self.spawnset.clone();
        command.apply(&mut edited)?;
        self.spawnset = edited;
        Ok(self.history.save(&self.spawnset, command.label()))
    }

    pub fn undo(&mut self) -> Result<(), HistoryError> {
        self.spawnset = self.history.undo()?;
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), HistoryError> {
        self.spawnset = self.history.redo()?;
        Ok(())
    }

    /// Replace the document, e.g. after opening a file
    pub fn replace(&mut self, spawnset: SpawnsetBinary) {
        self.history.reset(&spawnset);
        self.spawnset = spawnset;
    }

    pub fn into_spawnset(self) -> SpawnsetBinary {
        self.spawnset
    }
}
