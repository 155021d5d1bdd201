//! Derived views over a spawn schedule
//!
//! Waves are a game rule, not part of the binary: survival spawnsets loop
//! every spawn after the last [`EnemyType::Empty`] spawn, each repetition a
//! little faster. [`GameRules`] supplies those rules; [`DefaultRules`] holds
//! the values of the current game release.

use super::binary::SpawnsetBinary;
use super::types::{EnemyType, GameMode, HandLevel, Spawn};

/// Game rules needed to explain a spawn schedule
pub trait GameRules {
    /// Gems dropped by an enemy killed without farming
    fn no_farm_gems(&self, enemy: EnemyType) -> i32;

    /// Total gems needed to reach a hand level
    fn gems_for_hand_level(&self, level: HandLevel) -> i32;

    /// Spawn as it plays in loop repetition `wave` (0 is the first pass)
    fn loop_spawn(&self, spawn: Spawn, wave: usize) -> Spawn;

    /// Hand level reached after collecting `total_gems`
    fn hand_level_for_gems(&self, total_gems: i32) -> HandLevel {
        [HandLevel::Level4, HandLevel::Level3, HandLevel::Level2]
            .into_iter()
            .find(|&level| total_gems >= self.gems_for_hand_level(level))
            .unwrap_or(HandLevel::Level1)
    }
}

/// Rules of the current game release
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRules;

impl GameRules for DefaultRules {
    fn no_farm_gems(&self, enemy: EnemyType) -> i32 {
        match enemy {
            EnemyType::Squid1 => 1,
            EnemyType::Squid2 => 2,
            EnemyType::Squid3 => 3,
            EnemyType::Centipede => 25,
            EnemyType::Gigapede => 50,
            EnemyType::Ghostpede => 10,
            EnemyType::Spider1 | EnemyType::Spider2 => 1,
            EnemyType::Leviathan => 6,
            EnemyType::Thorn | EnemyType::Empty => 0,
        }
    }

    fn gems_for_hand_level(&self, level: HandLevel) -> i32 {
        match level {
            HandLevel::Level1 => 0,
            HandLevel::Level2 => 10,
            HandLevel::Level3 => 70,
            HandLevel::Level4 => 150,
        }
    }

    fn loop_spawn(&self, spawn: Spawn, wave: usize) -> Spawn {
        let enemy_type = match spawn.enemy_type {
            EnemyType::Gigapede if wave % 3 == 2 => EnemyType::Ghostpede,
            other => other,
        };
        Spawn {
            enemy_type,
            delay: spawn.delay / (1.0 + wave as f32 / 8.0),
        }
    }
}

/// Gem count shown next to a spawn
///
/// `value` counts gems below level 3 and homing daggers from level 3 on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GemState {
    pub hand_level: HandLevel,
    pub value: i32,
}

/// One spawn with its derived values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnEntry {
    /// Index in the spawn list
    pub index: usize,
    pub enemy_type: EnemyType,
    pub delay: f32,
    /// Absolute spawn time
    pub seconds: f32,
    pub no_farm_gems: i32,
    pub gem_state: GemState,
}

/// Spawns split into the pre-loop section and a number of loop waves
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnsView {
    pub pre_loop: Vec<SpawnEntry>,
    pub waves: Vec<Vec<SpawnEntry>>,
}

impl SpawnsView {
    pub fn new(spawnset: &SpawnsetBinary, rules: &impl GameRules, wave_count: usize) -> Self {
        let loop_start = loop_start_index(spawnset);
        let mut tracker = GemTracker::new(spawnset, rules);
        let mut seconds = 0.0f32;

        let entry = |index: usize, spawn: Spawn, tracker: &mut GemTracker, seconds: &mut f32| {
            *seconds += spawn.delay;
            let no_farm_gems = rules.no_farm_gems(spawn.enemy_type);
            SpawnEntry {
                index,
                enemy_type: spawn.enemy_type,
                delay: spawn.delay,
                seconds: *seconds,
                no_farm_gems,
                gem_state: tracker.collect(no_farm_gems, rules),
            }
        };

        let pre_loop = spawnset.spawns[..loop_start]
            .iter()
            .enumerate()
            .map(|(i, &spawn)| entry(i, spawn, &mut tracker, &mut seconds))
            .collect();

        let loop_spawns = &spawnset.spawns[loop_start..];
        let waves = if loop_spawns.is_empty() {
            Vec::new()
        } else {
            (0..wave_count)
                .map(|wave| {
                    loop_spawns
                        .iter()
                        .enumerate()
                        .map(|(i, &spawn)| {
                            entry(loop_start + i, rules.loop_spawn(spawn, wave), &mut tracker, &mut seconds)
                        })
                        .collect()
                })
                .collect()
        };

        Self { pre_loop, waves }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpawnEntry> {
        self.pre_loop.iter().chain(self.waves.iter().flatten())
    }

    /// Sum of no-farm gems over the pre-loop section and all waves
    pub fn total_no_farm_gems(&self) -> i32 {
        self.iter().map(|e| e.no_farm_gems).sum()
    }
}

/// First index of the looping section
///
/// Only survival loops. Without an empty spawn the whole schedule loops.
pub fn loop_start_index(spawnset: &SpawnsetBinary) -> usize {
    if spawnset.game_mode != GameMode::Survival {
        return spawnset.spawns.len();
    }
    spawnset
        .spawns
        .iter()
        .rposition(|s| s.enemy_type == EnemyType::Empty)
        .map_or(0, |i| i + 1)
}

struct GemTracker {
    total_gems: i32,
    homing: i32,
    hand_level: HandLevel,
}

impl GemTracker {
    fn new(spawnset: &SpawnsetBinary, rules: &impl GameRules) -> Self {
        let hand_level = spawnset.hand_level;
        let base = rules.gems_for_hand_level(hand_level);
        if hand_level >= HandLevel::Level3 {
            Self {
                total_gems: base,
                homing: spawnset.additional_gems,
                hand_level,
            }
        } else {
            let total_gems = base + spawnset.additional_gems;
            Self {
                total_gems,
                homing: 0,
                hand_level: rules.hand_level_for_gems(total_gems).max(hand_level),
            }
        }
    }

    fn collect(&mut self, gems: i32, rules: &impl GameRules) -> GemState {
        let before = self.hand_level;
        self.total_gems += gems;
        self.hand_level = rules.hand_level_for_gems(self.total_gems).max(before);

        if before >= HandLevel::Level3 {
            self.homing += gems;
        } else if self.hand_level >= HandLevel::Level3 {
            self.homing = self.total_gems - rules.gems_for_hand_level(HandLevel::Level3);
        }

        GemState {
            hand_level: self.hand_level,
            value: if self.hand_level >= HandLevel::Level3 {
                self.homing
            } else {
                self.total_gems
            },
        }
    }
}
