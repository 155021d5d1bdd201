//! Spawnset binary format (`dd/survival` and custom spawnsets)
//!
//! # Layout
//! ```text
//! 0x00: spawn_version i32
//! 0x04: world_version i32
//! 0x08: shrink_end f32
//! 0x0C: shrink_start f32
//! 0x10: shrink_rate f32
//! 0x14: brightness f32
//! 0x18: game_mode i32
//! 0x1C: arena_dimension i32
//! 0x20: reserved i32 (1)
//! 0x24: arena tiles (arena_dimension^2 * f32, row-major)
//! var:  race dagger x f32, z f32          (world_version >= 9)
//! var:  spawn_count i32
//! var:  spawns (spawn_count * 28 bytes): enemy_type i32, delay f32, 20 constant bytes
//! var:  hand_level u8, additional_gems i32 (spawn_version >= 5)
//! var:  timer_start f32                   (spawn_version >= 6)
//! ```

use super::types::{EnemyType, GameMode, GameVersion, HandLevel, Spawn};
use super::SpawnsetError;
use dagger_shared::{BinaryReader, ByteSink, ContentHash};
use glam::Vec2;

pub const HEADER_SIZE: usize = 36;
pub const SPAWN_SIZE: usize = 28;

/// Arena height of a tile that is not part of the floor
pub const VOID_TILE_HEIGHT: f32 = -1000.0;

/// Newest versions written by the current game
pub const CURRENT_SPAWN_VERSION: i32 = 6;
pub const CURRENT_WORLD_VERSION: i32 = 9;

/// Tail of every spawn record, never read
const SPAWN_TRAILER: [u8; 20] = {
    let mut bytes = [0u8; 20];
    let three = 3i32.to_le_bytes();
    let one = 1.0f32.to_le_bytes();
    let ten = 10i32.to_le_bytes();
    let mut i = 0;
    while i < 4 {
        bytes[4 + i] = three[i];
        bytes[12 + i] = one[i];
        bytes[16 + i] = ten[i];
        i += 1;
    }
    bytes
};

/// Square grid of tile heights
#[derive(Debug, Clone, PartialEq)]
pub struct Arena {
    dimension: usize,
    tiles: Vec<f32>,
}

impl Arena {
    pub fn new(dimension: usize, height: f32) -> Self {
        Self {
            dimension,
            tiles: vec![height; dimension * dimension],
        }
    }

    pub fn from_tiles(dimension: usize, tiles: Vec<f32>) -> Option<Self> {
        (tiles.len() == dimension * dimension).then_some(Self { dimension, tiles })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn tiles(&self) -> &[f32] {
        &self.tiles
    }

    pub fn get(&self, x: usize, z: usize) -> Option<f32> {
        (x < self.dimension && z < self.dimension).then(|| self.tiles[z * self.dimension + x])
    }

    pub fn set(&mut self, x: usize, z: usize, height: f32) -> bool {
        if x >= self.dimension || z >= self.dimension {
            return false;
        }
        self.tiles[z * self.dimension + x] = height;
        true
    }
}

/// Level configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnsetBinary {
    pub spawn_version: i32,
    pub world_version: i32,
    pub shrink_end: f32,
    pub shrink_start: f32,
    pub shrink_rate: f32,
    pub brightness: f32,
    pub game_mode: GameMode,
    pub arena: Arena,
    /// Only meaningful in race mode
    pub race_dagger_position: Vec2,
    pub spawns: Vec<Spawn>,
    pub hand_level: HandLevel,
    pub additional_gems: i32,
    pub timer_start: f32,
}

impl Default for SpawnsetBinary {
    /// Empty survival spawnset on a flat disc
    fn default() -> Self {
        let dimension = 51;
        let center = (dimension / 2) as f32;
        let mut arena = Arena::new(dimension, VOID_TILE_HEIGHT);
        for z in 0..dimension {
            for x in 0..dimension {
                let distance = Vec2::new(x as f32 - center, z as f32 - center).length();
                if distance <= 20.0 {
                    arena.set(x, z, 0.0);
                }
            }
        }

        Self {
            spawn_version: CURRENT_SPAWN_VERSION,
            world_version: CURRENT_WORLD_VERSION,
            shrink_end: 20.0,
            shrink_start: 50.0,
            shrink_rate: 0.025,
            brightness: 60.0,
            game_mode: GameMode::Survival,
            arena,
            race_dagger_position: Vec2::ZERO,
            spawns: Vec::new(),
            hand_level: HandLevel::Level1,
            additional_gems: 0,
            timer_start: 0.0,
        }
    }
}

impl SpawnsetBinary {
    pub fn parse(data: &[u8]) -> Result<Self, SpawnsetError> {
        let mut reader = BinaryReader::new(data);

        let spawn_version = reader.read_i32("spawn_version")?;
        let world_version = reader.read_i32("world_version")?;
        let shrink_end = reader.read_f32("shrink_end")?;
        let shrink_start = reader.read_f32("shrink_start")?;
        let shrink_rate = reader.read_f32("shrink_rate")?;
        let brightness = reader.read_f32("brightness")?;
        let game_mode = GameMode::from_i32(reader.read_i32("game_mode")?)?;
        let arena_dimension = reader.read_i32("arena_dimension")?;
        reader.skip("header reserved", 4)?;

        if arena_dimension < 0 {
            return Err(SpawnsetError::NegativeArenaDimension(arena_dimension));
        }
        let dimension = arena_dimension as usize;
        let tile_count = dimension * dimension;
        reader.ensure("arena", tile_count.saturating_mul(4))?;
        let mut tiles = Vec::with_capacity(tile_count);
        for _ in 0..tile_count {
            tiles.push(reader.read_f32("arena tile")?);
        }

        let race_dagger_position = if world_version >= 9 {
            reader.read_vec2("race_dagger_position")?
        } else {
            Vec2::ZERO
        };

        let spawn_count = reader.read_i32("spawn_count")?;
        if spawn_count < 0 {
            return Err(SpawnsetError::NegativeSpawnCount(spawn_count));
        }
        reader.ensure("spawns", (spawn_count as usize).saturating_mul(SPAWN_SIZE))?;
        let mut spawns = Vec::with_capacity(spawn_count as usize);
        for index in 0..spawn_count as usize {
            let value = reader.read_i32("spawn enemy_type")?;
            let enemy_type =
                EnemyType::from_i32(value).ok_or(SpawnsetError::InvalidEnemyType { index, value })?;
            let delay = reader.read_f32("spawn delay")?;
            reader.skip("spawn trailer", SPAWN_TRAILER.len())?;
            spawns.push(Spawn { enemy_type, delay });
        }

        let (hand_level, additional_gems) = if spawn_version >= 5 {
            let hand_level = HandLevel::from_u8(reader.read_u8("hand_level")?)?;
            (hand_level, reader.read_i32("additional_gems")?)
        } else {
            (HandLevel::Level1, 0)
        };

        let timer_start = if spawn_version >= 6 {
            reader.read_f32("timer_start")?
        } else {
            0.0
        };

        if !reader.is_at_end() {
            tracing::debug!("Spawnset has {} trailing bytes", reader.remaining());
        }

        Ok(Self {
            spawn_version,
            world_version,
            shrink_end,
            shrink_start,
            shrink_rate,
            brightness,
            game_mode,
            arena: Arena { dimension, tiles },
            race_dagger_position,
            spawns,
            hand_level,
            additional_gems,
            timer_start,
        })
    }

    /// Serialize with the full field set; version numbers are written as they are
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            HEADER_SIZE + self.arena.tiles.len() * 4 + 12 + self.spawns.len() * SPAWN_SIZE + 9,
        );

        out.put_i32(self.spawn_version);
        out.put_i32(self.world_version);
        out.put_f32(self.shrink_end);
        out.put_f32(self.shrink_start);
        out.put_f32(self.shrink_rate);
        out.put_f32(self.brightness);
        out.put_i32(self.game_mode.to_i32());
        out.put_i32(self.arena.dimension as i32);
        out.put_i32(1);

        for &tile in &self.arena.tiles {
            out.put_f32(tile);
        }

        if self.world_version >= 9 {
            out.put_vec2(self.race_dagger_position);
        }

        out.put_i32(self.spawns.len() as i32);
        for spawn in &self.spawns {
            out.put_i32(spawn.enemy_type.to_i32());
            out.put_f32(spawn.delay);
            out.put_bytes(&SPAWN_TRAILER);
        }

        out.put_u8(self.hand_level.to_u8());
        out.put_i32(self.additional_gems);
        out.put_f32(self.timer_start);

        out
    }

    pub fn hash(&self) -> ContentHash {
        ContentHash::of(&self.to_bytes())
    }

    pub fn supported_game_version(&self) -> GameVersion {
        match (self.world_version, self.spawn_version) {
            (..=8, _) => GameVersion::V1_0,
            (_, ..=4) => GameVersion::V3_0,
            (_, 5) => GameVersion::V3_1,
            _ => GameVersion::V3_2,
        }
    }

    /// Whether the practice fields (hand level, additional gems) are stored
    pub fn has_practice_fields(&self) -> bool {
        self.spawn_version >= 5
    }

    pub fn has_timer_start(&self) -> bool {
        self.spawn_version >= 6
    }

    /// Absolute spawn time per spawn, the running sum of delays
    pub fn spawn_seconds(&self) -> Vec<f32> {
        self.spawns
            .iter()
            .scan(0.0f32, |time, spawn| {
                *time += spawn.delay;
                Some(*time)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SpawnsetBinary {
        let mut spawnset = SpawnsetBinary {
            arena: Arena::new(3, 0.5),
            game_mode: GameMode::Race,
            race_dagger_position: Vec2::new(1.5, -2.0),
            hand_level: HandLevel::Level3,
            additional_gems: 42,
            timer_start: 12.5,
            ..Default::default()
        };
        spawnset.arena.set(1, 2, -1.0);
        spawnset.spawns = vec![
            Spawn::new(EnemyType::Squid1, 3.0),
            Spawn::new(EnemyType::Empty, 5.0),
            Spawn::new(EnemyType::Ghostpede, 0.25),
        ];
        spawnset
    }

    #[test]
    fn test_roundtrip_current_version() {
        let spawnset = sample();
        let bytes = spawnset.to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE + 9 * 4 + 8 + 4 + 3 * SPAWN_SIZE + 1 + 4 + 4);
        assert_eq!(SpawnsetBinary::parse(&bytes).unwrap(), spawnset);
    }

    #[test]
    fn test_spawn_trailer_constants() {
        let mut spawnset = sample();
        spawnset.spawns.truncate(1);
        let bytes = spawnset.to_bytes();
        let spawn_start = HEADER_SIZE + 9 * 4 + 8 + 4;
        let trailer = &bytes[spawn_start + 8..spawn_start + SPAWN_SIZE];
        assert_eq!(&trailer[4..8], &3i32.to_le_bytes());
        assert_eq!(&trailer[12..16], &1.0f32.to_le_bytes());
        assert_eq!(&trailer[16..20], &10i32.to_le_bytes());
    }

    #[test]
    fn test_spawn_version_4_omits_practice_fields() {
        let mut spawnset = sample();
        spawnset.spawn_version = 4;
        let bytes = spawnset.to_bytes();

        // Written fields become trailing bytes for version 4 readers
        let parsed = SpawnsetBinary::parse(&bytes).unwrap();
        assert_eq!(parsed.hand_level, HandLevel::Level1);
        assert_eq!(parsed.additional_gems, 0);
        assert_eq!(parsed.timer_start, 0.0);
        assert_eq!(parsed.spawns, spawnset.spawns);
    }

    #[test]
    fn test_spawn_version_5_has_no_timer() {
        let mut spawnset = sample();
        spawnset.spawn_version = 5;
        let parsed = SpawnsetBinary::parse(&spawnset.to_bytes()).unwrap();
        assert_eq!(parsed.hand_level, HandLevel::Level3);
        assert_eq!(parsed.additional_gems, 42);
        assert_eq!(parsed.timer_start, 0.0);
    }

    #[test]
    fn test_old_version_roundtrip_with_defaults() {
        let mut spawnset = sample();
        spawnset.spawn_version = 4;
        spawnset.world_version = 8;
        spawnset.race_dagger_position = Vec2::ZERO;
        spawnset.hand_level = HandLevel::Level1;
        spawnset.additional_gems = 0;
        spawnset.timer_start = 0.0;
        assert_eq!(SpawnsetBinary::parse(&spawnset.to_bytes()).unwrap(), spawnset);
        assert_eq!(spawnset.supported_game_version(), GameVersion::V1_0);
    }

    #[test]
    fn test_truncated_spawns() {
        let bytes = sample().to_bytes();
        let cut = HEADER_SIZE + 9 * 4 + 8 + 4 + SPAWN_SIZE;
        let err = SpawnsetBinary::parse(&bytes[..cut]).unwrap_err();
        assert!(matches!(
            err,
            SpawnsetError::Format(dagger_shared::FormatError::Truncated { field: "spawns", .. })
        ));
    }

    #[test]
    fn test_spawn_seconds() {
        assert_eq!(sample().spawn_seconds(), vec![3.0, 8.0, 8.25]);
    }

    #[test]
    fn test_default_arena() {
        let spawnset = SpawnsetBinary::default();
        assert_eq!(spawnset.arena.dimension(), 51);
        assert_eq!(spawnset.arena.get(25, 25), Some(0.0));
        assert_eq!(spawnset.arena.get(0, 0), Some(VOID_TILE_HEIGHT));
        assert_eq!(spawnset.supported_game_version(), GameVersion::V3_2);
    }
}
