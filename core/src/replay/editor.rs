//! Editable replay timeline
//!
//! [`EditorReplayModel`] splits an event stream into one inputs record per
//! tick plus fourteen per-kind collections of [`EditorEvent`]s, each tagged
//! with its tick and, for spawns, the entity id it creates. [`compile`]
//! rebuilds a stream from those collections.
//!
//! Entity ids are implicit in the binary stream: they count spawn records
//! from 1 in stream order. Compilation therefore sorts the events of a tick
//! by entity id so spawns come out in id order; events without an id sort
//! first.
//!
//! [`compile`]: EditorReplayModel::compile

use super::events::{EventRecord, EventType, InitialInputsData, InputsData};
use super::events_data::ReplayEventsData;
use super::local::{LocalReplayBinary, LocalReplayHeader, UNKNOWN_SIZE};
use super::codec::write_record;
use crate::spawnset::SpawnsetBinary;
use dagger_shared::{ByteSink, ContentHash, ContentHasher};
use std::cell::OnceCell;
use tracing::{debug, warn};

const COLLECTION_COUNT: usize = EventType::COLLECTIONS.len();

/// Sort key for events that do not create an entity
const NO_ENTITY_SORT_KEY: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("event type not supported by timeline editor: {0}")]
    UnsupportedEventType(EventType),

    #[error("tick {tick} is out of range ({tick_count} ticks)")]
    TickOutOfRange { tick: usize, tick_count: usize },

    #[error("no {kind} event at index {index}")]
    EventNotFound { kind: EventType, index: usize },

    #[error("cannot store a {found} record in the {expected} collection")]
    KindMismatch { expected: EventType, found: EventType },
}

/// An event placed on the timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorEvent {
    pub tick_index: usize,
    /// Id of the entity this event spawns, `None` for non-spawn events
    pub entity_id: Option<i32>,
    pub data: EventRecord,
}

impl EditorEvent {
    fn sort_key(&self) -> i32 {
        self.entity_id.unwrap_or(NO_ENTITY_SORT_KEY)
    }
}

/// How inserting or removing a spawn treats other entity ids
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntityIdPolicy {
    /// Leave every other id and reference untouched
    #[default]
    Preserve,
    /// Renumber later spawns and every reference to them so ids stay dense
    ///
    /// Removing a spawn also removes the events referencing it, since the
    /// id they hold is handed to the next entity.
    Shift,
}

/// Location of an event inside a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRef {
    pub kind: EventType,
    pub index: usize,
}

/// Result of [`EditorReplayModel::remove_event`]
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedEvent {
    pub event: EditorEvent,
    /// Events that referenced the removed entity, located as they were
    /// before the removal
    pub dangling_refs: Vec<EventRef>,
    /// Events taken out under [`EntityIdPolicy::Shift`]: the ones at
    /// `dangling_refs` in that order, then events referencing any spawn
    /// among them. Empty under `Preserve`.
    pub dropped: Vec<EditorEvent>,
}

#[derive(Debug, Clone)]
pub struct EditorReplayModel {
    pub version: i32,
    pub timestamp_since_game_release: i64,
    pub time: f32,
    pub start_time: f32,
    pub daggers_fired: i32,
    pub death_type: i32,
    pub gems: i32,
    pub daggers_hit: i32,
    pub kills: i32,
    pub player_id: i32,
    pub username: String,
    pub spawnset: SpawnsetBinary,

    look_speed: f32,
    inputs: Vec<InputsData>,
    collections: [Vec<EditorEvent>; COLLECTION_COUNT],
    policy: EntityIdPolicy,
    cache: OnceCell<ReplayEventsData>,
}

impl Default for EditorReplayModel {
    fn default() -> Self {
        Self {
            version: 1,
            timestamp_since_game_release: 0,
            time: 0.0,
            start_time: 0.0,
            daggers_fired: 0,
            death_type: 0,
            gems: 0,
            daggers_hit: 0,
            kills: 0,
            player_id: 0,
            username: String::new(),
            spawnset: SpawnsetBinary::default(),
            look_speed: 0.0,
            inputs: Vec::new(),
            collections: Default::default(),
            policy: EntityIdPolicy::default(),
            cache: OnceCell::new(),
        }
    }
}

impl EditorReplayModel {
    /// Empty replay with a default spawnset
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay fetched from the leaderboard, which carries no header
    pub fn from_leaderboard_replay(player_id: i32, username: impl Into<String>, events: &ReplayEventsData) -> Self {
        let mut model = Self {
            player_id,
            username: username.into(),
            ..Self::default()
        };
        model.add_events_data(events);
        model
    }

    pub fn from_local_replay(replay: &LocalReplayBinary) -> Self {
        let header = &replay.header;
        let mut model = Self {
            version: header.version,
            timestamp_since_game_release: header.timestamp_since_game_release,
            time: header.time,
            start_time: header.start_time,
            daggers_fired: header.daggers_fired,
            death_type: header.death_type,
            gems: header.gems,
            daggers_hit: header.daggers_hit,
            kills: header.kills,
            player_id: header.player_id,
            username: header.username.clone(),
            spawnset: header.spawnset.clone(),
            ..Self::default()
        };
        model.add_events_data(&replay.events);
        model
    }

    fn add_events_data(&mut self, events: &ReplayEventsData) {
        let mut tick = 0;
        let mut next_entity_id = 1;

        for &record in events.events() {
            match record {
                EventRecord::InitialInputs(initial) => {
                    self.look_speed = initial.look_speed;
                    self.inputs.push(initial.inputs);
                    tick += 1;
                }
                EventRecord::Inputs(inputs) => {
                    self.inputs.push(inputs);
                    tick += 1;
                }
                EventRecord::End => {}
                data => {
                    let entity_id = data.is_spawn().then(|| {
                        let id = next_entity_id;
                        next_entity_id += 1;
                        id
                    });
                    if let Some(index) = data.event_type().collection_index() {
                        self.collections[index].push(EditorEvent {
                            tick_index: tick,
                            entity_id,
                            data,
                        });
                    }
                }
            }
        }

        self.invalidate_cache();
        debug!(
            "Decomposed {} events into {} ticks ({} entities)",
            events.events().len(),
            tick,
            next_entity_id - 1
        );
    }

    pub fn policy(&self) -> EntityIdPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: EntityIdPolicy) {
        self.policy = policy;
    }

    pub fn look_speed(&self) -> f32 {
        self.look_speed
    }

    pub fn set_look_speed(&mut self, look_speed: f32) {
        self.look_speed = look_speed;
        self.invalidate_cache();
    }

    /// One inputs record per tick
    pub fn inputs(&self) -> &[InputsData] {
        &self.inputs
    }

    /// Mutable inputs of the existing ticks; invalidates the compiled stream
    pub fn inputs_mut(&mut self) -> &mut [InputsData] {
        self.invalidate_cache();
        &mut self.inputs
    }

    /// Append a tick
    pub fn push_tick(&mut self, inputs: InputsData) {
        self.inputs.push(inputs);
        self.invalidate_cache();
    }

    /// Shorten the timeline to `tick_count` ticks
    ///
    /// Events on removed ticks are removed with them. Returns how many
    /// events were removed.
    pub fn truncate_ticks(&mut self, tick_count: usize) -> usize {
        self.inputs.truncate(tick_count);
        let before = self.event_count();
        for collection in &mut self.collections {
            collection.retain(|e| e.tick_index < tick_count);
        }
        self.invalidate_cache();
        before - self.event_count()
    }

    pub fn tick_count(&self) -> usize {
        self.inputs.len()
    }

    /// Events of one collection in insertion order
    pub fn events(&self, kind: EventType) -> Result<&[EditorEvent], EditorError> {
        let index = kind
            .collection_index()
            .ok_or(EditorError::UnsupportedEventType(kind))?;
        Ok(&self.collections[index])
    }

    /// Every event on the given tick, in collection order
    pub fn events_at_tick(&self, tick: usize) -> impl Iterator<Item = &EditorEvent> {
        self.collections
            .iter()
            .flatten()
            .filter(move |e| e.tick_index == tick)
    }

    /// Total number of events across all collections
    pub fn event_count(&self) -> usize {
        self.collections.iter().map(Vec::len).sum()
    }

    /// Insert a default record of `kind` at `tick`
    ///
    /// Returns the index of the new event in its collection.
    pub fn add_empty_event(&mut self, tick: usize, kind: EventType) -> Result<usize, EditorError> {
        let data = kind
            .default_record()
            .ok_or(EditorError::UnsupportedEventType(kind))?;
        self.add_event(tick, data)
    }

    /// Insert `data` at `tick`
    ///
    /// A spawn gets the id following the highest id on the nearest tick at or
    /// before `tick` that has a spawn, or 1 if there is none.
    pub fn add_event(&mut self, tick: usize, data: EventRecord) -> Result<usize, EditorError> {
        let kind = data.event_type();
        let index = kind
            .collection_index()
            .ok_or(EditorError::UnsupportedEventType(kind))?;
        if tick >= self.tick_count() {
            return Err(EditorError::TickOutOfRange {
                tick,
                tick_count: self.tick_count(),
            });
        }

        let entity_id = if data.is_spawn() {
            let id = self.next_entity_id_at(tick);
            if self.policy == EntityIdPolicy::Shift {
                self.shift_entity_ids(id, 1);
            }
            Some(id)
        } else {
            None
        };

        let collection = &mut self.collections[index];
        collection.push(EditorEvent {
            tick_index: tick,
            entity_id,
            data,
        });
        let position = collection.len() - 1;

        self.invalidate_cache();
        Ok(position)
    }

    /// Remove the event at `index` of the `kind` collection
    pub fn remove_event(&mut self, kind: EventType, index: usize) -> Result<RemovedEvent, EditorError> {
        let collection_index = kind
            .collection_index()
            .ok_or(EditorError::UnsupportedEventType(kind))?;
        if index >= self.collections[collection_index].len() {
            return Err(EditorError::EventNotFound { kind, index });
        }

        let event = self.collections[collection_index].remove(index);
        let mut dropped = Vec::new();
        let dangling_refs = match event.entity_id {
            Some(removed_id) => {
                let dangling = self.refs_to(removed_id);
                if self.policy == EntityIdPolicy::Shift {
                    dropped = self.drop_references(removed_id, &dangling);
                }
                dangling
            }
            None => Vec::new(),
        };

        if !dangling_refs.is_empty() {
            debug!(
                "Removed entity {:?} was referenced by {} events ({} dropped)",
                event.entity_id,
                dangling_refs.len(),
                dropped.len()
            );
        }

        self.invalidate_cache();
        Ok(RemovedEvent {
            event,
            dangling_refs,
            dropped,
        })
    }

    /// Replace the record of an existing event, keeping its tick and id
    pub fn replace_event_data(&mut self, kind: EventType, index: usize, data: EventRecord) -> Result<(), EditorError> {
        if data.event_type() != kind {
            return Err(EditorError::KindMismatch {
                expected: kind,
                found: data.event_type(),
            });
        }
        let collection_index = kind
            .collection_index()
            .ok_or(EditorError::UnsupportedEventType(kind))?;
        let event = self.collections[collection_index]
            .get_mut(index)
            .ok_or(EditorError::EventNotFound { kind, index })?;
        event.data = data;

        self.invalidate_cache();
        Ok(())
    }

    /// Compiled stream, rebuilt on first access after a change
    pub fn compiled(&self) -> &ReplayEventsData {
        self.cache.get_or_init(|| self.compile())
    }

    /// Rebuild the event stream from the collections
    ///
    /// Each tick emits its events sorted by entity id (stable, events
    /// without an id first), then its inputs record; tick 0 emits the
    /// initial inputs record carrying the look speed. The stream ends with
    /// an end record. Events on ticks past the last inputs record (possible
    /// only when decomposing a stream that ends without one) are dropped.
    pub fn compile(&self) -> ReplayEventsData {
        let tick_count = self.tick_count();
        let mut ticks: Vec<Vec<&EditorEvent>> = vec![Vec::new(); tick_count];
        let mut dropped = 0;

        for event in self.collections.iter().flatten() {
            match ticks.get_mut(event.tick_index) {
                Some(bucket) => bucket.push(event),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            warn!("Dropped {dropped} events placed after the last tick ({tick_count} ticks)");
        }

        let mut events_data = ReplayEventsData::new();
        for (tick, (bucket, inputs)) in ticks.iter_mut().zip(&self.inputs).enumerate() {
            bucket.sort_by_key(|e| e.sort_key());
            for event in bucket.iter() {
                events_data.add_event(event.data);
            }

            if tick == 0 {
                events_data.add_event(EventRecord::InitialInputs(InitialInputsData {
                    inputs: *inputs,
                    look_speed: self.look_speed,
                }));
            } else {
                events_data.add_event(EventRecord::Inputs(*inputs));
            }
        }
        events_data.add_event(EventRecord::End);

        events_data
    }

    /// MD5 over the editable content
    ///
    /// Covers the look speed, the inputs and every collection in collection
    /// order, each prefixed by its length. Ticks and entity ids are not
    /// hashed. Only events that [`compile`](Self::compile) emits count.
    pub fn to_hash(&self) -> ContentHash {
        let mut hasher = ContentHasher::new();

        hasher.put_f32(self.look_speed);
        hasher.put_i32(len_i32(self.inputs.len()));
        for inputs in &self.inputs {
            write_record(&mut hasher, &EventRecord::Inputs(*inputs));
        }

        let tick_count = self.tick_count();
        for collection in &self.collections {
            let placed: Vec<_> = collection.iter().filter(|e| e.tick_index < tick_count).collect();
            hasher.put_i32(len_i32(placed.len()));
            for event in placed {
                write_record(&mut hasher, &event.data);
            }
        }

        hasher.finish()
    }

    /// Local replay file with the header scalars and the compiled stream
    pub fn to_local_replay(&self) -> LocalReplayBinary {
        LocalReplayBinary {
            header: LocalReplayHeader {
                version: self.version,
                timestamp_since_game_release: self.timestamp_since_game_release,
                time: self.time,
                start_time: self.start_time,
                daggers_fired: self.daggers_fired,
                death_type: self.death_type,
                gems: self.gems,
                daggers_hit: self.daggers_hit,
                kills: self.kills,
                player_id: self.player_id,
                username: self.username.clone(),
                unknown: [0; UNKNOWN_SIZE],
                spawnset: self.spawnset.clone(),
            },
            events: self.compiled().clone(),
        }
    }

    fn invalidate_cache(&mut self) {
        self.cache.take();
    }

    /// Backward scan for the id a spawn inserted at `tick` should get
    fn next_entity_id_at(&self, tick: usize) -> i32 {
        let nearest = self
            .collections
            .iter()
            .flatten()
            .filter(|e| e.tick_index <= tick)
            .filter_map(|e| e.entity_id.map(|id| (e.tick_index, id)))
            .max();
        nearest.map_or(1, |(_, id)| id + 1)
    }

    /// Add `delta` to every spawn id and reference whose magnitude is at
    /// least `from`; negated references keep their sign
    fn shift_entity_ids(&mut self, from: i32, delta: i32) {
        for event in self.collections.iter_mut().flatten() {
            if let Some(id) = event.entity_id.as_mut() {
                if *id >= from {
                    *id += delta;
                }
            }
            event.data.for_each_entity_ref(|r| {
                if r.unsigned_abs() >= from.unsigned_abs() {
                    *r += delta * r.signum();
                }
            });
        }
    }

    /// Remove the events referencing `removed_id` along with everything that
    /// references a spawn removed this way, then close the freed ids
    fn drop_references(&mut self, removed_id: i32, refs: &[EventRef]) -> Vec<EditorEvent> {
        let mut dropped = self.take_events(refs);
        let mut freed = vec![removed_id];

        let mut next = 0;
        while next < dropped.len() {
            if let Some(id) = dropped[next].entity_id {
                freed.push(id);
                let refs = self.refs_to(id);
                dropped.extend(self.take_events(&refs));
            }
            next += 1;
        }

        // Highest first so each shift sees ids from before the removal
        freed.sort_unstable_by(|a, b| b.cmp(a));
        for id in freed {
            self.shift_entity_ids(id + 1, -1);
        }
        dropped
    }

    /// Remove the events at `refs`, returning them in the same order
    fn take_events(&mut self, refs: &[EventRef]) -> Vec<EditorEvent> {
        let mut taken: Vec<(usize, EditorEvent)> = Vec::with_capacity(refs.len());
        let mut order: Vec<usize> = (0..refs.len()).collect();
        // Highest index first so earlier positions stay valid
        order.sort_by_key(|&i| std::cmp::Reverse((refs[i].kind.collection_index(), refs[i].index)));
        for i in order {
            let EventRef { kind, index } = refs[i];
            if let Some(collection_index) = kind.collection_index() {
                taken.push((i, self.collections[collection_index].remove(index)));
            }
        }
        taken.sort_by_key(|&(i, _)| i);
        taken.into_iter().map(|(_, event)| event).collect()
    }

    fn refs_to(&mut self, entity_id: i32) -> Vec<EventRef> {
        let mut refs = Vec::new();
        for (kind, collection) in EventType::COLLECTIONS.iter().zip(self.collections.iter_mut()) {
            for (index, event) in collection.iter_mut().enumerate() {
                let mut hit = false;
                event
                    .data
                    .for_each_entity_ref(|r| hit |= r.unsigned_abs() == entity_id.unsigned_abs());
                if hit {
                    refs.push(EventRef { kind: *kind, index });
                }
            }
        }
        refs
    }
}

fn len_i32(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}
