//! Replay event records
//!
//! Every record kind is a variant of [`EventRecord`]; routing between the
//! flat stream and the editor's per-kind collections is an exhaustive match.

use dagger_shared::I16Mat3;
use glam::{I16Vec3, Mat3, Vec3};

/// Per-tick player input
///
/// `jump`: 0 none, 1 hold, 2 started press. `shoot` / `shoot_homing`: 0 none, 1 hold, 2 release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InputsData {
    pub left: bool,
    pub right: bool,
    pub forward: bool,
    pub backward: bool,
    pub jump: u8,
    pub shoot: u8,
    pub shoot_homing: u8,
    pub mouse_x: i16,
    pub mouse_y: i16,
}

/// Inputs of the first tick, carrying the mouse look speed
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InitialInputsData {
    pub inputs: InputsData,
    pub look_speed: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoidSpawnData {
    pub spawner_entity_id: i32,
    pub boid_type: u8,
    pub position: I16Vec3,
    pub orientation: I16Mat3,
    pub velocity: Vec3,
    pub speed: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DaggerSpawnData {
    pub a: i32,
    pub position: I16Vec3,
    pub orientation: I16Mat3,
    pub is_shot: bool,
    pub dagger_type: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityOrientationData {
    pub entity_id: i32,
    pub orientation: I16Mat3,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityPositionData {
    pub entity_id: i32,
    pub position: I16Vec3,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityTargetData {
    pub entity_id: i32,
    pub target_position: I16Vec3,
}

/// Hit between two entities
///
/// When `entity_id_a` is 0 the player died and `entity_id_b` is not an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitData {
    pub entity_id_a: i32,
    pub entity_id_b: i32,
    pub user_data: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LeviathanSpawnData {
    pub a: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PedeType {
    #[default]
    Centipede,
    Gigapede,
    Ghostpede,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PedeSpawnData {
    pub pede_type: PedeType,
    pub a: i32,
    pub position: Vec3,
    pub b: Vec3,
    pub orientation: Mat3,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpiderEggSpawnData {
    pub spawner_entity_id: i32,
    pub position: Vec3,
    pub target_position: Vec3,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SpiderType {
    #[default]
    Spider1,
    Spider2,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpiderSpawnData {
    pub spider_type: SpiderType,
    pub a: i32,
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SquidType {
    #[default]
    Squid1,
    Squid2,
    Squid3,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SquidSpawnData {
    pub squid_type: SquidType,
    pub a: i32,
    pub position: Vec3,
    pub direction: Vec3,
    pub rotation_in_radians: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThornSpawnData {
    pub a: i32,
    pub position: Vec3,
    pub rotation_in_radians: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransmuteData {
    pub entity_id: i32,
    pub a: I16Vec3,
    pub b: I16Vec3,
    pub c: I16Vec3,
    pub d: I16Vec3,
}

/// One record of a replay event stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventRecord {
    BoidSpawn(BoidSpawnData),
    DaggerSpawn(DaggerSpawnData),
    EntityOrientation(EntityOrientationData),
    EntityPosition(EntityPositionData),
    EntityTarget(EntityTargetData),
    Gem,
    Hit(HitData),
    LeviathanSpawn(LeviathanSpawnData),
    PedeSpawn(PedeSpawnData),
    SpiderEggSpawn(SpiderEggSpawnData),
    SpiderSpawn(SpiderSpawnData),
    SquidSpawn(SquidSpawnData),
    ThornSpawn(ThornSpawnData),
    Transmute(TransmuteData),
    InitialInputs(InitialInputsData),
    Inputs(InputsData),
    End,
}

/// Record kind without its data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventType {
    BoidSpawn,
    DaggerSpawn,
    EntityOrientation,
    EntityPosition,
    EntityTarget,
    Gem,
    Hit,
    LeviathanSpawn,
    PedeSpawn,
    SpiderEggSpawn,
    SpiderSpawn,
    SquidSpawn,
    ThornSpawn,
    Transmute,
    InitialInputs,
    Inputs,
    End,
}

impl EventType {
    /// Kinds stored as editable collections, in compile and hash order
    pub const COLLECTIONS: [EventType; 14] = [
        Self::BoidSpawn,
        Self::DaggerSpawn,
        Self::EntityOrientation,
        Self::EntityPosition,
        Self::EntityTarget,
        Self::Gem,
        Self::Hit,
        Self::LeviathanSpawn,
        Self::PedeSpawn,
        Self::SpiderEggSpawn,
        Self::SpiderSpawn,
        Self::SquidSpawn,
        Self::ThornSpawn,
        Self::Transmute,
    ];

    /// Position in [`Self::COLLECTIONS`], `None` for inputs and end records
    pub fn collection_index(self) -> Option<usize> {
        match self {
            Self::InitialInputs | Self::Inputs | Self::End => None,
            other => Some(other as usize),
        }
    }

    /// Whether records of this kind create an entity
    pub fn is_spawn(self) -> bool {
        matches!(
            self,
            Self::BoidSpawn
                | Self::DaggerSpawn
                | Self::LeviathanSpawn
                | Self::PedeSpawn
                | Self::SpiderEggSpawn
                | Self::SpiderSpawn
                | Self::SquidSpawn
                | Self::ThornSpawn
        )
    }

    /// Default record for this kind, `None` for inputs and end records
    pub fn default_record(self) -> Option<EventRecord> {
        let record = match self {
            Self::BoidSpawn => EventRecord::BoidSpawn(BoidSpawnData {
                orientation: I16Mat3::IDENTITY,
                ..Default::default()
            }),
            Self::DaggerSpawn => EventRecord::DaggerSpawn(DaggerSpawnData {
                orientation: I16Mat3::IDENTITY,
                ..Default::default()
            }),
            Self::EntityOrientation => EventRecord::EntityOrientation(EntityOrientationData {
                orientation: I16Mat3::IDENTITY,
                ..Default::default()
            }),
            Self::EntityPosition => EventRecord::EntityPosition(EntityPositionData::default()),
            Self::EntityTarget => EventRecord::EntityTarget(EntityTargetData::default()),
            Self::Gem => EventRecord::Gem,
            Self::Hit => EventRecord::Hit(HitData::default()),
            Self::LeviathanSpawn => EventRecord::LeviathanSpawn(LeviathanSpawnData::default()),
            Self::PedeSpawn => EventRecord::PedeSpawn(PedeSpawnData {
                orientation: Mat3::IDENTITY,
                ..Default::default()
            }),
            Self::SpiderEggSpawn => EventRecord::SpiderEggSpawn(SpiderEggSpawnData::default()),
            Self::SpiderSpawn => EventRecord::SpiderSpawn(SpiderSpawnData::default()),
            Self::SquidSpawn => EventRecord::SquidSpawn(SquidSpawnData::default()),
            Self::ThornSpawn => EventRecord::ThornSpawn(ThornSpawnData::default()),
            Self::Transmute => EventRecord::Transmute(TransmuteData::default()),
            Self::InitialInputs | Self::Inputs | Self::End => return None,
        };
        Some(record)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

impl EventRecord {
    pub fn event_type(&self) -> EventType {
        match self {
            Self::BoidSpawn(_) => EventType::BoidSpawn,
            Self::DaggerSpawn(_) => EventType::DaggerSpawn,
            Self::EntityOrientation(_) => EventType::EntityOrientation,
            Self::EntityPosition(_) => EventType::EntityPosition,
            Self::EntityTarget(_) => EventType::EntityTarget,
            Self::Gem => EventType::Gem,
            Self::Hit(_) => EventType::Hit,
            Self::LeviathanSpawn(_) => EventType::LeviathanSpawn,
            Self::PedeSpawn(_) => EventType::PedeSpawn,
            Self::SpiderEggSpawn(_) => EventType::SpiderEggSpawn,
            Self::SpiderSpawn(_) => EventType::SpiderSpawn,
            Self::SquidSpawn(_) => EventType::SquidSpawn,
            Self::ThornSpawn(_) => EventType::ThornSpawn,
            Self::Transmute(_) => EventType::Transmute,
            Self::InitialInputs(_) => EventType::InitialInputs,
            Self::Inputs(_) => EventType::Inputs,
            Self::End => EventType::End,
        }
    }

    pub fn is_spawn(&self) -> bool {
        self.event_type().is_spawn()
    }

    /// Inputs records close a tick
    pub fn advances_tick(&self) -> bool {
        matches!(self, Self::InitialInputs(_) | Self::Inputs(_))
    }

    /// Entity created by this record, `None` for non-spawn records
    pub fn entity_type(&self) -> Option<EntityType> {
        let entity = match self {
            Self::BoidSpawn(_) => EntityType::Boid,
            Self::DaggerSpawn(_) => EntityType::Dagger,
            Self::LeviathanSpawn(_) => EntityType::Leviathan,
            Self::PedeSpawn(d) => match d.pede_type {
                PedeType::Centipede => EntityType::Centipede,
                PedeType::Gigapede => EntityType::Gigapede,
                PedeType::Ghostpede => EntityType::Ghostpede,
            },
            Self::SpiderEggSpawn(_) => EntityType::SpiderEgg,
            Self::SpiderSpawn(d) => match d.spider_type {
                SpiderType::Spider1 => EntityType::Spider1,
                SpiderType::Spider2 => EntityType::Spider2,
            },
            Self::SquidSpawn(d) => match d.squid_type {
                SquidType::Squid1 => EntityType::Squid1,
                SquidType::Squid2 => EntityType::Squid2,
                SquidType::Squid3 => EntityType::Squid3,
            },
            Self::ThornSpawn(_) => EntityType::Thorn,
            _ => return None,
        };
        Some(entity)
    }

    /// Visit every field holding an entity id reference
    ///
    /// Spawn records do not reference their own id; boid and spider egg
    /// spawns reference their spawner. Player death hits skip `entity_id_b`.
    pub fn for_each_entity_ref(&mut self, mut f: impl FnMut(&mut i32)) {
        match self {
            Self::BoidSpawn(d) => f(&mut d.spawner_entity_id),
            Self::SpiderEggSpawn(d) => f(&mut d.spawner_entity_id),
            Self::EntityOrientation(d) => f(&mut d.entity_id),
            Self::EntityPosition(d) => f(&mut d.entity_id),
            Self::EntityTarget(d) => f(&mut d.entity_id),
            Self::Transmute(d) => f(&mut d.entity_id),
            Self::Hit(d) => {
                let player_death = d.entity_id_a == 0;
                f(&mut d.entity_id_a);
                if !player_death {
                    f(&mut d.entity_id_b);
                }
            }
            Self::DaggerSpawn(_)
            | Self::Gem
            | Self::LeviathanSpawn(_)
            | Self::PedeSpawn(_)
            | Self::SpiderSpawn(_)
            | Self::SquidSpawn(_)
            | Self::ThornSpawn(_)
            | Self::InitialInputs(_)
            | Self::Inputs(_)
            | Self::End => {}
        }
    }
}

/// Kind of entity behind an entity id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    /// Entity id 0
    Player,
    Dagger,
    Squid1,
    Squid2,
    Squid3,
    Boid,
    Centipede,
    Gigapede,
    Ghostpede,
    Spider1,
    Spider2,
    SpiderEgg,
    Leviathan,
    Thorn,
}

impl EntityType {
    /// Number of hittable parts; pedes are hit per segment
    pub fn part_count(self) -> u32 {
        match self {
            Self::Squid1 | Self::Spider1 | Self::Spider2 => 1,
            Self::Squid2 => 2,
            Self::Squid3 => 3,
            Self::Leviathan => 6,
            Self::Centipede => 25,
            Self::Gigapede => 50,
            Self::Ghostpede => 10,
            Self::Player | Self::Dagger | Self::Boid | Self::SpiderEgg | Self::Thorn => 1,
        }
    }
}
