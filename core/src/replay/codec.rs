//! Wire encoding of single event records
//!
//! Records carry no length prefix: a tag byte selects the layout. Spawn
//! records (tag 0x00) carry a second tag byte for the spawned kind.
//!
//! | tag  | record             | body                                              |
//! |------|--------------------|---------------------------------------------------|
//! | 0x00 | spawn              | sub-tag u8, spawn body                            |
//! | 0x01 | entity position    | entity_id i32, position I16Vec3                   |
//! | 0x02 | entity orientation | entity_id i32, orientation I16Mat3                |
//! | 0x04 | entity target      | entity_id i32, target I16Vec3                     |
//! | 0x05 | hit                | entity_id_a i32, entity_id_b i32, user_data i32   |
//! | 0x06 | gem                |                                                   |
//! | 0x07 | transmute          | entity_id i32, 4 x I16Vec3                        |
//! | 0x09 | inputs             | see [`write_inputs`], terminated by 0x0A          |
//! | 0x0B | end                |                                                   |

use super::events::*;
use super::EventsError;
use dagger_shared::{BinaryReader, ByteSink};

pub const TAG_SPAWN: u8 = 0x00;
pub const TAG_ENTITY_POSITION: u8 = 0x01;
pub const TAG_ENTITY_ORIENTATION: u8 = 0x02;
pub const TAG_ENTITY_TARGET: u8 = 0x04;
pub const TAG_HIT: u8 = 0x05;
pub const TAG_GEM: u8 = 0x06;
pub const TAG_TRANSMUTE: u8 = 0x07;
pub const TAG_INPUTS: u8 = 0x09;
pub const TAG_END: u8 = 0x0B;

/// Trailing byte of every inputs record
pub const INPUTS_TERMINATOR: u8 = 0x0A;

pub const SPAWN_DAGGER: u8 = 0x01;
pub const SPAWN_SQUID1: u8 = 0x03;
pub const SPAWN_SQUID2: u8 = 0x04;
pub const SPAWN_SQUID3: u8 = 0x05;
pub const SPAWN_BOID: u8 = 0x06;
pub const SPAWN_CENTIPEDE: u8 = 0x07;
pub const SPAWN_SPIDER1: u8 = 0x08;
pub const SPAWN_SPIDER2: u8 = 0x09;
pub const SPAWN_SPIDER_EGG: u8 = 0x0A;
pub const SPAWN_LEVIATHAN: u8 = 0x0B;
pub const SPAWN_GIGAPEDE: u8 = 0x0C;
pub const SPAWN_THORN: u8 = 0x0D;
pub const SPAWN_GHOSTPEDE: u8 = 0x0F;

/// Append one record, tag included
pub fn write_record(out: &mut impl ByteSink, record: &EventRecord) {
    match record {
        EventRecord::BoidSpawn(d) => {
            out.put_u8(TAG_SPAWN);
            out.put_u8(SPAWN_BOID);
            out.put_i32(d.spawner_entity_id);
            out.put_u8(d.boid_type);
            out.put_i16_vec3(d.position);
            out.put_i16_mat3(d.orientation);
            out.put_vec3(d.velocity);
            out.put_f32(d.speed);
        }
        EventRecord::DaggerSpawn(d) => {
            out.put_u8(TAG_SPAWN);
            out.put_u8(SPAWN_DAGGER);
            out.put_i32(d.a);
            out.put_i16_vec3(d.position);
            out.put_i16_mat3(d.orientation);
            out.put_bool(d.is_shot);
            out.put_u8(d.dagger_type);
        }
        EventRecord::EntityOrientation(d) => {
            out.put_u8(TAG_ENTITY_ORIENTATION);
            out.put_i32(d.entity_id);
            out.put_i16_mat3(d.orientation);
        }
        EventRecord::EntityPosition(d) => {
            out.put_u8(TAG_ENTITY_POSITION);
            out.put_i32(d.entity_id);
            out.put_i16_vec3(d.position);
        }
        EventRecord::EntityTarget(d) => {
            out.put_u8(TAG_ENTITY_TARGET);
            out.put_i32(d.entity_id);
            out.put_i16_vec3(d.target_position);
        }
        EventRecord::Gem => out.put_u8(TAG_GEM),
        EventRecord::Hit(d) => {
            out.put_u8(TAG_HIT);
            out.put_i32(d.entity_id_a);
            out.put_i32(d.entity_id_b);
            out.put_i32(d.user_data);
        }
        EventRecord::LeviathanSpawn(d) => {
            out.put_u8(TAG_SPAWN);
            out.put_u8(SPAWN_LEVIATHAN);
            out.put_i32(d.a);
        }
        EventRecord::PedeSpawn(d) => {
            out.put_u8(TAG_SPAWN);
            out.put_u8(match d.pede_type {
                PedeType::Centipede => SPAWN_CENTIPEDE,
                PedeType::Gigapede => SPAWN_GIGAPEDE,
                PedeType::Ghostpede => SPAWN_GHOSTPEDE,
            });
            out.put_i32(d.a);
            out.put_vec3(d.position);
            out.put_vec3(d.b);
            out.put_mat3(d.orientation);
        }
        EventRecord::SpiderEggSpawn(d) => {
            out.put_u8(TAG_SPAWN);
            out.put_u8(SPAWN_SPIDER_EGG);
            out.put_i32(d.spawner_entity_id);
            out.put_vec3(d.position);
            out.put_vec3(d.target_position);
        }
        EventRecord::SpiderSpawn(d) => {
            out.put_u8(TAG_SPAWN);
            out.put_u8(match d.spider_type {
                SpiderType::Spider1 => SPAWN_SPIDER1,
                SpiderType::Spider2 => SPAWN_SPIDER2,
            });
            out.put_i32(d.a);
            out.put_vec3(d.position);
        }
        EventRecord::SquidSpawn(d) => {
            out.put_u8(TAG_SPAWN);
            out.put_u8(match d.squid_type {
                SquidType::Squid1 => SPAWN_SQUID1,
                SquidType::Squid2 => SPAWN_SQUID2,
                SquidType::Squid3 => SPAWN_SQUID3,
            });
            out.put_i32(d.a);
            out.put_vec3(d.position);
            out.put_vec3(d.direction);
            out.put_f32(d.rotation_in_radians);
        }
        EventRecord::ThornSpawn(d) => {
            out.put_u8(TAG_SPAWN);
            out.put_u8(SPAWN_THORN);
            out.put_i32(d.a);
            out.put_vec3(d.position);
            out.put_f32(d.rotation_in_radians);
        }
        EventRecord::Transmute(d) => {
            out.put_u8(TAG_TRANSMUTE);
            out.put_i32(d.entity_id);
            out.put_i16_vec3(d.a);
            out.put_i16_vec3(d.b);
            out.put_i16_vec3(d.c);
            out.put_i16_vec3(d.d);
        }
        EventRecord::InitialInputs(d) => {
            out.put_u8(TAG_INPUTS);
            write_inputs(out, &d.inputs, Some(d.look_speed));
        }
        EventRecord::Inputs(d) => {
            out.put_u8(TAG_INPUTS);
            write_inputs(out, d, None);
        }
        EventRecord::End => out.put_u8(TAG_END),
    }
}

/// Inputs body: four movement bools, jump, shoot, shoot_homing (u8),
/// mouse_x, mouse_y (i16), look_speed (f32, first record only), 0x0A
pub fn write_inputs(out: &mut impl ByteSink, inputs: &InputsData, look_speed: Option<f32>) {
    out.put_bool(inputs.left);
    out.put_bool(inputs.right);
    out.put_bool(inputs.forward);
    out.put_bool(inputs.backward);
    out.put_u8(inputs.jump);
    out.put_u8(inputs.shoot);
    out.put_u8(inputs.shoot_homing);
    out.put_i16(inputs.mouse_x);
    out.put_i16(inputs.mouse_y);
    if let Some(look_speed) = look_speed {
        out.put_f32(look_speed);
    }
    out.put_u8(INPUTS_TERMINATOR);
}

/// Read one record
///
/// `initial_inputs_read` selects the layout of the next inputs record: the
/// first one in a stream carries the look speed.
pub fn read_record(reader: &mut BinaryReader<'_>, initial_inputs_read: bool) -> Result<EventRecord, EventsError> {
    let offset = reader.position();
    let tag = reader.read_u8("event tag")?;

    let record = match tag {
        TAG_SPAWN => read_spawn(reader)?,
        TAG_ENTITY_POSITION => EventRecord::EntityPosition(EntityPositionData {
            entity_id: reader.read_i32("entity position id")?,
            position: reader.read_i16_vec3("entity position")?,
        }),
        TAG_ENTITY_ORIENTATION => EventRecord::EntityOrientation(EntityOrientationData {
            entity_id: reader.read_i32("entity orientation id")?,
            orientation: reader.read_i16_mat3("entity orientation")?,
        }),
        TAG_ENTITY_TARGET => EventRecord::EntityTarget(EntityTargetData {
            entity_id: reader.read_i32("entity target id")?,
            target_position: reader.read_i16_vec3("entity target")?,
        }),
        TAG_HIT => EventRecord::Hit(HitData {
            entity_id_a: reader.read_i32("hit entity a")?,
            entity_id_b: reader.read_i32("hit entity b")?,
            user_data: reader.read_i32("hit user data")?,
        }),
        TAG_GEM => EventRecord::Gem,
        TAG_TRANSMUTE => EventRecord::Transmute(TransmuteData {
            entity_id: reader.read_i32("transmute entity id")?,
            a: reader.read_i16_vec3("transmute a")?,
            b: reader.read_i16_vec3("transmute b")?,
            c: reader.read_i16_vec3("transmute c")?,
            d: reader.read_i16_vec3("transmute d")?,
        }),
        TAG_INPUTS => {
            let inputs = InputsData {
                left: reader.read_bool("inputs left")?,
                right: reader.read_bool("inputs right")?,
                forward: reader.read_bool("inputs forward")?,
                backward: reader.read_bool("inputs backward")?,
                jump: reader.read_u8("inputs jump")?,
                shoot: reader.read_u8("inputs shoot")?,
                shoot_homing: reader.read_u8("inputs shoot homing")?,
                mouse_x: reader.read_i16("inputs mouse x")?,
                mouse_y: reader.read_i16("inputs mouse y")?,
            };
            let record = if initial_inputs_read {
                EventRecord::Inputs(inputs)
            } else {
                EventRecord::InitialInputs(InitialInputsData {
                    inputs,
                    look_speed: reader.read_f32("inputs look speed")?,
                })
            };

            let terminator_offset = reader.position();
            let terminator = reader.read_u8("inputs terminator")?;
            if terminator != INPUTS_TERMINATOR {
                return Err(EventsError::InvalidInputsTerminator {
                    offset: terminator_offset,
                    value: terminator,
                });
            }
            record
        }
        TAG_END => EventRecord::End,
        _ => return Err(EventsError::UnknownEventTag { offset, tag }),
    };

    Ok(record)
}

fn read_spawn(reader: &mut BinaryReader<'_>) -> Result<EventRecord, EventsError> {
    let offset = reader.position();
    let sub_tag = reader.read_u8("spawn tag")?;

    let record = match sub_tag {
        SPAWN_DAGGER => EventRecord::DaggerSpawn(DaggerSpawnData {
            a: reader.read_i32("dagger a")?,
            position: reader.read_i16_vec3("dagger position")?,
            orientation: reader.read_i16_mat3("dagger orientation")?,
            is_shot: reader.read_bool("dagger is shot")?,
            dagger_type: reader.read_u8("dagger type")?,
        }),
        SPAWN_SQUID1 | SPAWN_SQUID2 | SPAWN_SQUID3 => EventRecord::SquidSpawn(SquidSpawnData {
            squid_type: match sub_tag {
                SPAWN_SQUID1 => SquidType::Squid1,
                SPAWN_SQUID2 => SquidType::Squid2,
                _ => SquidType::Squid3,
            },
            a: reader.read_i32("squid a")?,
            position: reader.read_vec3("squid position")?,
            direction: reader.read_vec3("squid direction")?,
            rotation_in_radians: reader.read_f32("squid rotation")?,
        }),
        SPAWN_BOID => EventRecord::BoidSpawn(BoidSpawnData {
            spawner_entity_id: reader.read_i32("boid spawner")?,
            boid_type: reader.read_u8("boid type")?,
            position: reader.read_i16_vec3("boid position")?,
            orientation: reader.read_i16_mat3("boid orientation")?,
            velocity: reader.read_vec3("boid velocity")?,
            speed: reader.read_f32("boid speed")?,
        }),
        SPAWN_CENTIPEDE | SPAWN_GIGAPEDE | SPAWN_GHOSTPEDE => EventRecord::PedeSpawn(PedeSpawnData {
            pede_type: match sub_tag {
                SPAWN_CENTIPEDE => PedeType::Centipede,
                SPAWN_GIGAPEDE => PedeType::Gigapede,
                _ => PedeType::Ghostpede,
            },
            a: reader.read_i32("pede a")?,
            position: reader.read_vec3("pede position")?,
            b: reader.read_vec3("pede b")?,
            orientation: reader.read_mat3("pede orientation")?,
        }),
        SPAWN_SPIDER1 | SPAWN_SPIDER2 => EventRecord::SpiderSpawn(SpiderSpawnData {
            spider_type: if sub_tag == SPAWN_SPIDER1 {
                SpiderType::Spider1
            } else {
                SpiderType::Spider2
            },
            a: reader.read_i32("spider a")?,
            position: reader.read_vec3("spider position")?,
        }),
        SPAWN_SPIDER_EGG => EventRecord::SpiderEggSpawn(SpiderEggSpawnData {
            spawner_entity_id: reader.read_i32("spider egg spawner")?,
            position: reader.read_vec3("spider egg position")?,
            target_position: reader.read_vec3("spider egg target")?,
        }),
        SPAWN_LEVIATHAN => EventRecord::LeviathanSpawn(LeviathanSpawnData {
            a: reader.read_i32("leviathan a")?,
        }),
        SPAWN_THORN => EventRecord::ThornSpawn(ThornSpawnData {
            a: reader.read_i32("thorn a")?,
            position: reader.read_vec3("thorn position")?,
            rotation_in_radians: reader.read_f32("thorn rotation")?,
        }),
        _ => return Err(EventsError::UnknownSpawnTag { offset, tag: sub_tag }),
    };

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagger_shared::I16Mat3;
    use glam::{I16Vec3, Mat3, Vec3};

    fn encode(record: &EventRecord) -> Vec<u8> {
        let mut out = Vec::new();
        write_record(&mut out, record);
        out
    }

    #[test]
    fn test_record_sizes() {
        let sizes = [
            (EventType::BoidSpawn, 2 + 4 + 1 + 6 + 18 + 12 + 4),
            (EventType::DaggerSpawn, 2 + 4 + 6 + 18 + 1 + 1),
            (EventType::EntityOrientation, 1 + 4 + 18),
            (EventType::EntityPosition, 1 + 4 + 6),
            (EventType::EntityTarget, 1 + 4 + 6),
            (EventType::Gem, 1),
            (EventType::Hit, 1 + 12),
            (EventType::LeviathanSpawn, 2 + 4),
            (EventType::PedeSpawn, 2 + 4 + 12 + 12 + 36),
            (EventType::SpiderEggSpawn, 2 + 4 + 12 + 12),
            (EventType::SpiderSpawn, 2 + 4 + 12),
            (EventType::SquidSpawn, 2 + 4 + 12 + 12 + 4),
            (EventType::ThornSpawn, 2 + 4 + 12 + 4),
            (EventType::Transmute, 1 + 4 + 24),
        ];
        for (kind, size) in sizes {
            let record = kind.default_record().unwrap();
            assert_eq!(encode(&record).len(), size, "{kind}");
        }
        assert_eq!(encode(&EventRecord::Inputs(InputsData::default())).len(), 1 + 7 + 4 + 1);
        assert_eq!(
            encode(&EventRecord::InitialInputs(InitialInputsData::default())).len(),
            1 + 7 + 4 + 4 + 1
        );
    }

    #[test]
    fn test_hit_layout() {
        let bytes = encode(&EventRecord::Hit(HitData {
            entity_id_a: 1,
            entity_id_b: -2,
            user_data: 3,
        }));
        assert_eq!(bytes[0], TAG_HIT);
        assert_eq!(&bytes[1..5], &1i32.to_le_bytes());
        assert_eq!(&bytes[5..9], &(-2i32).to_le_bytes());
        assert_eq!(&bytes[9..13], &3i32.to_le_bytes());
    }

    #[test]
    fn test_spawn_sub_tags_decode() {
        let records = [
            EventRecord::SquidSpawn(SquidSpawnData {
                squid_type: SquidType::Squid3,
                a: 7,
                position: Vec3::new(1.0, 2.0, 3.0),
                direction: Vec3::X,
                rotation_in_radians: 0.5,
            }),
            EventRecord::PedeSpawn(PedeSpawnData {
                pede_type: PedeType::Ghostpede,
                a: 1,
                position: Vec3::Y,
                b: Vec3::Z,
                orientation: Mat3::from_cols_array(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]),
            }),
            EventRecord::SpiderSpawn(SpiderSpawnData {
                spider_type: SpiderType::Spider2,
                a: -1,
                position: Vec3::ONE,
            }),
            EventRecord::BoidSpawn(BoidSpawnData {
                spawner_entity_id: 4,
                boid_type: 3,
                position: I16Vec3::new(-5, 6, 7),
                orientation: I16Mat3::IDENTITY,
                velocity: Vec3::new(0.5, 0.0, 0.0),
                speed: 10.0,
            }),
        ];
        for record in records {
            let bytes = encode(&record);
            let mut reader = BinaryReader::new(&bytes);
            assert_eq!(read_record(&mut reader, true).unwrap(), record);
            assert!(reader.is_at_end());
        }
    }

    #[test]
    fn test_inputs_layout_depends_on_position() {
        let inputs = InputsData {
            forward: true,
            jump: 2,
            mouse_x: -3,
            ..Default::default()
        };
        let initial = EventRecord::InitialInputs(InitialInputsData { inputs, look_speed: 20.0 });
        let bytes = encode(&initial);

        let mut reader = BinaryReader::new(&bytes);
        assert_eq!(read_record(&mut reader, false).unwrap(), initial);

        // Read as a regular inputs record the look speed lands on the terminator
        let mut reader = BinaryReader::new(&bytes);
        assert!(matches!(
            read_record(&mut reader, true),
            Err(EventsError::InvalidInputsTerminator { offset: 12, .. })
        ));
    }

    #[test]
    fn test_unknown_tags() {
        let mut reader = BinaryReader::new(&[0x03]);
        assert!(matches!(
            read_record(&mut reader, true),
            Err(EventsError::UnknownEventTag { offset: 0, tag: 0x03 })
        ));

        let mut reader = BinaryReader::new(&[TAG_SPAWN, 0x02]);
        assert!(matches!(
            read_record(&mut reader, true),
            Err(EventsError::UnknownSpawnTag { offset: 1, tag: 0x02 })
        ));
    }

    #[test]
    fn test_truncated_record() {
        let bytes = encode(&EventRecord::Hit(HitData::default()));
        let mut reader = BinaryReader::new(&bytes[..8]);
        assert!(matches!(read_record(&mut reader, true), Err(EventsError::Format(_))));
    }
}
