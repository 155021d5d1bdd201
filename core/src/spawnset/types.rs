//! Value types stored in a spawnset

use super::SpawnsetError;

/// Game mode (i32 in the binary)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameMode {
    #[default]
    Survival,
    TimeAttack,
    Race,
}

impl GameMode {
    pub fn from_i32(value: i32) -> Result<Self, SpawnsetError> {
        match value {
            0 => Ok(Self::Survival),
            1 => Ok(Self::TimeAttack),
            2 => Ok(Self::Race),
            _ => Err(SpawnsetError::InvalidGameMode(value)),
        }
    }

    pub fn to_i32(self) -> i32 {
        match self {
            Self::Survival => 0,
            Self::TimeAttack => 1,
            Self::Race => 2,
        }
    }
}

/// Starting hand upgrade (u8 in the binary, 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum HandLevel {
    #[default]
    Level1,
    Level2,
    Level3,
    Level4,
}

impl HandLevel {
    pub fn from_u8(value: u8) -> Result<Self, SpawnsetError> {
        match value {
            1 => Ok(Self::Level1),
            2 => Ok(Self::Level2),
            3 => Ok(Self::Level3),
            4 => Ok(Self::Level4),
            _ => Err(SpawnsetError::InvalidHandLevel(value)),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Self::Level1 => 1,
            Self::Level2 => 2,
            Self::Level3 => 3,
            Self::Level4 => 4,
        }
    }
}

/// Enemy scheduled by a spawn (i32 in the binary, `-1` is an empty spawn)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnemyType {
    Squid1,
    Squid2,
    Centipede,
    Spider1,
    Leviathan,
    Gigapede,
    Squid3,
    Thorn,
    Spider2,
    Ghostpede,
    #[default]
    Empty,
}

impl EnemyType {
    pub const ALL: [EnemyType; 11] = [
        Self::Squid1,
        Self::Squid2,
        Self::Centipede,
        Self::Spider1,
        Self::Leviathan,
        Self::Gigapede,
        Self::Squid3,
        Self::Thorn,
        Self::Spider2,
        Self::Ghostpede,
        Self::Empty,
    ];

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            -1 => Some(Self::Empty),
            0..=9 => Some(Self::ALL[value as usize]),
            _ => None,
        }
    }

    pub fn to_i32(self) -> i32 {
        match self {
            Self::Empty => -1,
            other => Self::ALL.iter().position(|&e| e == other).map_or(-1, |i| i as i32),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Squid1 => "Squid I",
            Self::Squid2 => "Squid II",
            Self::Centipede => "Centipede",
            Self::Spider1 => "Spider I",
            Self::Leviathan => "Leviathan",
            Self::Gigapede => "Gigapede",
            Self::Squid3 => "Squid III",
            Self::Thorn => "Thorn",
            Self::Spider2 => "Spider II",
            Self::Ghostpede => "Ghostpede",
            Self::Empty => "Empty",
        }
    }
}

impl std::fmt::Display for EnemyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of the spawn schedule
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spawn {
    pub enemy_type: EnemyType,
    /// Seconds after the previous spawn
    pub delay: f32,
}

impl Spawn {
    pub fn new(enemy_type: EnemyType, delay: f32) -> Self {
        Self { enemy_type, delay }
    }
}

/// Oldest game release able to play a spawnset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GameVersion {
    V1_0,
    V2_0,
    V3_0,
    V3_1,
    V3_2,
}

impl std::fmt::Display for GameVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::V1_0 => "V1",
            Self::V2_0 => "V2",
            Self::V3_0 => "V3",
            Self::V3_1 => "V3.1",
            Self::V3_2 => "V3.2",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enemy_type_indices() {
        assert_eq!(EnemyType::from_i32(-1), Some(EnemyType::Empty));
        assert_eq!(EnemyType::from_i32(4), Some(EnemyType::Leviathan));
        assert_eq!(EnemyType::from_i32(9), Some(EnemyType::Ghostpede));
        assert_eq!(EnemyType::from_i32(10), None);

        for enemy in EnemyType::ALL {
            assert_eq!(EnemyType::from_i32(enemy.to_i32()), Some(enemy));
        }
    }

    #[test]
    fn test_hand_level_is_one_based() {
        assert_eq!(HandLevel::from_u8(1).unwrap(), HandLevel::Level1);
        assert_eq!(HandLevel::Level4.to_u8(), 4);
        assert!(matches!(HandLevel::from_u8(0), Err(SpawnsetError::InvalidHandLevel(0))));
    }

    #[test]
    fn test_game_mode() {
        assert_eq!(GameMode::from_i32(2).unwrap(), GameMode::Race);
        assert!(GameMode::from_i32(3).is_err());
    }
}
