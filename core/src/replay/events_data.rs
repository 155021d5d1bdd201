//! Flat event stream with its tick index

use super::codec::{read_record, write_record};
use super::events::{EntityType, EventRecord};
use super::EventsError;
use dagger_shared::{BinaryReader, ByteSink};
use tracing::debug;

/// Ordered event records plus derived lookup tables
///
/// `event_offsets_per_tick` starts at `[0]` and gains an entry each time an
/// inputs record is added, so tick `i` spans
/// `events[offsets[i]..offsets[i + 1]]` and ends with its inputs record. The
/// end record belongs to no tick.
///
/// `entity_types` maps entity ids to kinds: slot 0 is the player, every spawn
/// record appends one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayEventsData {
    events: Vec<EventRecord>,
    event_offsets_per_tick: Vec<usize>,
    entity_types: Vec<EntityType>,
}

impl Default for ReplayEventsData {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            event_offsets_per_tick: vec![0],
            entity_types: vec![EntityType::Player],
        }
    }
}

impl ReplayEventsData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a complete stream
    ///
    /// The stream must stop at exactly one end record with nothing after it,
    /// and every event before the end record must belong to a closed tick.
    pub fn parse(data: &[u8]) -> Result<Self, EventsError> {
        let mut reader = BinaryReader::new(data);
        let mut events_data = Self::new();
        let mut initial_inputs_read = false;

        loop {
            if reader.is_at_end() {
                return Err(EventsError::MissingEnd);
            }

            let record = read_record(&mut reader, initial_inputs_read)?;
            initial_inputs_read |= record.advances_tick();
            let is_end = matches!(record, EventRecord::End);
            events_data.add_event(record);
            if is_end {
                break;
            }
        }

        if !reader.is_at_end() {
            return Err(EventsError::TrailingData {
                offset: reader.position(),
                count: reader.remaining(),
            });
        }

        let unterminated = events_data.unterminated_count();
        if unterminated > 0 {
            return Err(EventsError::UnterminatedTick { count: unterminated });
        }

        debug!(
            "Parsed {} events over {} ticks ({} entities)",
            events_data.events.len(),
            events_data.tick_count(),
            events_data.entity_types.len() - 1
        );

        Ok(events_data)
    }

    /// Append a record and update the tick index and entity table
    pub fn add_event(&mut self, record: EventRecord) {
        if let Some(entity_type) = record.entity_type() {
            self.entity_types.push(entity_type);
        }
        let advances_tick = record.advances_tick();
        self.events.push(record);
        if advances_tick {
            self.event_offsets_per_tick.push(self.events.len());
        }
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn event_offsets_per_tick(&self) -> &[usize] {
        &self.event_offsets_per_tick
    }

    pub fn entity_types(&self) -> &[EntityType] {
        &self.entity_types
    }

    pub fn tick_count(&self) -> usize {
        self.event_offsets_per_tick.len() - 1
    }

    /// Events of one tick, its inputs record last
    pub fn events_at_tick(&self, tick: usize) -> Option<&[EventRecord]> {
        let start = *self.event_offsets_per_tick.get(tick)?;
        let end = *self.event_offsets_per_tick.get(tick + 1)?;
        self.events.get(start..end)
    }

    /// Kind of the entity behind `entity_id`
    ///
    /// Negative ids refer to the same entity as their magnitude (dead pede
    /// segments are reported negated).
    pub fn entity_type(&self, entity_id: i32) -> Option<EntityType> {
        let index = usize::try_from(entity_id.unsigned_abs()).ok()?;
        self.entity_types.get(index).copied()
    }

    /// Number of spawned entities, the player excluded
    pub fn spawn_count(&self) -> usize {
        self.entity_types.len() - 1
    }

    /// Check the stream shape before encoding
    ///
    /// The first inputs record must be the initial inputs record, no other
    /// record may be, the end record must be last and appear once, and every
    /// event before it must be closed by an inputs record.
    pub fn validate(&self) -> Result<(), EventsError> {
        let mut inputs_seen = false;

        for (index, record) in self.events.iter().enumerate() {
            match record {
                EventRecord::InitialInputs(_) if inputs_seen => {
                    return Err(EventsError::MisplacedInitialInputs { index });
                }
                EventRecord::InitialInputs(_) => inputs_seen = true,
                EventRecord::Inputs(_) if !inputs_seen => {
                    return Err(EventsError::MissingInitialInputs { index });
                }
                EventRecord::End if index + 1 != self.events.len() => {
                    return Err(EventsError::MisplacedEnd { index });
                }
                _ => {}
            }
        }

        if !matches!(self.events.last(), Some(EventRecord::End)) {
            return Err(EventsError::MissingEnd);
        }

        let unterminated = self.unterminated_count();
        if unterminated > 0 {
            return Err(EventsError::UnterminatedTick { count: unterminated });
        }

        Ok(())
    }

    /// Encode the stream after [`Self::validate`]
    pub fn to_bytes(&self) -> Result<Vec<u8>, EventsError> {
        self.validate()?;
        let mut out = Vec::new();
        self.write_to(&mut out);
        Ok(out)
    }

    /// Encode every record without validation
    pub fn write_to(&self, out: &mut impl ByteSink) {
        for record in &self.events {
            write_record(out, record);
        }
    }

    /// Events after the last tick boundary, the end record excluded
    fn unterminated_count(&self) -> usize {
        let closed = self.event_offsets_per_tick.last().copied().unwrap_or(0);
        self.events
            .iter()
            .skip(closed)
            .filter(|e| !matches!(e, EventRecord::End))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::events::*;

    fn scenario() -> Vec<EventRecord> {
        vec![
            EventRecord::InitialInputs(InitialInputsData {
                look_speed: 20.0,
                ..Default::default()
            }),
            EventRecord::BoidSpawn(BoidSpawnData::default()),
            EventRecord::Inputs(InputsData::default()),
            EventRecord::Hit(HitData {
                entity_id_a: 1,
                entity_id_b: 0,
                user_data: 0,
            }),
            EventRecord::Inputs(InputsData::default()),
            EventRecord::End,
        ]
    }

    fn encode(records: &[EventRecord]) -> Vec<u8> {
        let mut out = Vec::new();
        for record in records {
            write_record(&mut out, record);
        }
        out
    }

    #[test]
    fn test_decode_scenario_offsets() {
        let data = ReplayEventsData::parse(&encode(&scenario())).unwrap();

        assert_eq!(data.events().len(), 6);
        assert_eq!(data.event_offsets_per_tick(), &[0, 1, 3, 5]);
        assert_eq!(data.tick_count(), 3);
        assert_eq!(data.events_at_tick(0).unwrap().len(), 1);
        assert!(matches!(data.events_at_tick(1).unwrap()[0], EventRecord::BoidSpawn(_)));
        assert!(matches!(data.events_at_tick(2).unwrap()[0], EventRecord::Hit(_)));
        assert!(data.events_at_tick(3).is_none());
        assert_eq!(data.entity_type(0), Some(EntityType::Player));
        assert_eq!(data.entity_type(1), Some(EntityType::Boid));
        assert_eq!(data.entity_type(-1), Some(EntityType::Boid));
        assert_eq!(data.entity_type(2), None);
    }

    #[test]
    fn test_reencode_is_identical() {
        let bytes = encode(&scenario());
        let data = ReplayEventsData::parse(&bytes).unwrap();
        assert_eq!(data.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_missing_end() {
        let mut records = scenario();
        records.pop();
        assert_eq!(
            ReplayEventsData::parse(&encode(&records)),
            Err(EventsError::MissingEnd)
        );
        assert_eq!(ReplayEventsData::parse(&[]), Err(EventsError::MissingEnd));
    }

    #[test]
    fn test_trailing_data() {
        let mut bytes = encode(&scenario());
        let end = bytes.len();
        bytes.extend_from_slice(&[0x06, 0x06]);
        assert_eq!(
            ReplayEventsData::parse(&bytes),
            Err(EventsError::TrailingData { offset: end, count: 2 })
        );
    }

    #[test]
    fn test_events_after_last_tick() {
        let mut records = scenario();
        records.insert(5, EventRecord::Gem);
        assert_eq!(
            ReplayEventsData::parse(&encode(&records)),
            Err(EventsError::UnterminatedTick { count: 1 })
        );
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        let mut data = ReplayEventsData::new();
        data.add_event(EventRecord::Inputs(InputsData::default()));
        data.add_event(EventRecord::End);
        assert_eq!(data.validate(), Err(EventsError::MissingInitialInputs { index: 0 }));

        let mut data = ReplayEventsData::new();
        data.add_event(EventRecord::InitialInputs(InitialInputsData::default()));
        data.add_event(EventRecord::InitialInputs(InitialInputsData::default()));
        data.add_event(EventRecord::End);
        assert_eq!(data.validate(), Err(EventsError::MisplacedInitialInputs { index: 1 }));

        let mut data = ReplayEventsData::new();
        data.add_event(EventRecord::InitialInputs(InitialInputsData::default()));
        data.add_event(EventRecord::End);
        data.add_event(EventRecord::End);
        assert_eq!(data.validate(), Err(EventsError::MisplacedEnd { index: 1 }));
    }

    #[test]
    fn test_empty_stream_with_end_only() {
        let data = ReplayEventsData::parse(&[0x0B]).unwrap();
        assert_eq!(data.tick_count(), 0);
        assert_eq!(data.spawn_count(), 0);
        assert_eq!(data.to_bytes().unwrap(), vec![0x0B]);
    }
}
