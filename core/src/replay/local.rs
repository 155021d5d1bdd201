//! Local replay files (`.ddreplay`)
//!
//! ```text
//! identifier      "ddrpl." (6 bytes)
//! version         i32
//! timestamp       i64   seconds since game release
//! time            f32
//! start_time      f32
//! daggers_fired   i32
//! death_type      i32
//! gems            i32
//! daggers_hit     i32
//! kills           i32
//! player_id       i32
//! username        i32 length + bytes
//! unknown         10 bytes
//! spawnset        i32 length + spawnset bytes
//! events          i32 length + zlib-compressed event stream
//! ```

use super::events_data::ReplayEventsData;
use super::EventsError;
use crate::spawnset::{SpawnsetBinary, SpawnsetError};
use dagger_shared::{BinaryReader, ByteSink, FormatError};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use tracing::debug;

pub const LOCAL_REPLAY_IDENTIFIER: &[u8; 6] = b"ddrpl.";

/// Length of the opaque block between username and spawnset
pub const UNKNOWN_SIZE: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum LocalReplayError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("not a local replay (identifier {0:?})")]
    InvalidIdentifier(Vec<u8>),

    #[error("embedded spawnset: {0}")]
    Spawnset(#[from] SpawnsetError),

    #[error("event stream: {0}")]
    Events(#[from] EventsError),

    #[error("event stream compression: {0}")]
    Compression(#[from] std::io::Error),
}

/// Scalars stored before the event stream
#[derive(Debug, Clone, PartialEq)]
pub struct LocalReplayHeader {
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
    pub unknown: [u8; UNKNOWN_SIZE],
    pub spawnset: SpawnsetBinary,
}

impl LocalReplayHeader {
    fn read(reader: &mut BinaryReader<'_>) -> Result<Self, LocalReplayError> {
        let identifier = reader.read_slice("replay identifier", LOCAL_REPLAY_IDENTIFIER.len())?;
        if identifier != LOCAL_REPLAY_IDENTIFIER {
            return Err(LocalReplayError::InvalidIdentifier(identifier.to_vec()));
        }

        let version = reader.read_i32("replay version")?;
        let timestamp_since_game_release = reader.read_i64("replay timestamp")?;
        let time = reader.read_f32("replay time")?;
        let start_time = reader.read_f32("replay start time")?;
        let daggers_fired = reader.read_i32("replay daggers fired")?;
        let death_type = reader.read_i32("replay death type")?;
        let gems = reader.read_i32("replay gems")?;
        let daggers_hit = reader.read_i32("replay daggers hit")?;
        let kills = reader.read_i32("replay kills")?;
        let player_id = reader.read_i32("replay player id")?;
        let username = reader.read_string("replay username")?;

        let mut unknown = [0u8; UNKNOWN_SIZE];
        unknown.copy_from_slice(reader.read_slice("replay unknown block", UNKNOWN_SIZE)?);

        let spawnset_bytes = reader.read_blob("replay spawnset")?;
        let spawnset = SpawnsetBinary::parse(&spawnset_bytes)?;

        Ok(Self {
            version,
            timestamp_since_game_release,
            time,
            start_time,
            daggers_fired,
            death_type,
            gems,
            daggers_hit,
            kills,
            player_id,
            username,
            unknown,
            spawnset,
        })
    }

    fn write(&self, out: &mut impl ByteSink) {
        out.put_bytes(LOCAL_REPLAY_IDENTIFIER);
        out.put_i32(self.version);
        out.put_i64(self.timestamp_since_game_release);
        out.put_f32(self.time);
        out.put_f32(self.start_time);
        out.put_i32(self.daggers_fired);
        out.put_i32(self.death_type);
        out.put_i32(self.gems);
        out.put_i32(self.daggers_hit);
        out.put_i32(self.kills);
        out.put_i32(self.player_id);
        out.put_string(&self.username);
        out.put_bytes(&self.unknown);
        out.put_blob(&self.spawnset.to_bytes());
    }
}

/// A replay as saved by the game
#[derive(Debug, Clone, PartialEq)]
pub struct LocalReplayBinary {
    pub header: LocalReplayHeader,
    pub events: ReplayEventsData,
}

impl LocalReplayBinary {
    pub fn parse(data: &[u8]) -> Result<Self, LocalReplayError> {
        let mut reader = BinaryReader::new(data);
        let header = LocalReplayHeader::read(&mut reader)?;

        let compressed = reader.read_blob("replay events")?;
        let mut events_bytes = Vec::new();
        ZlibDecoder::new(compressed.as_slice()).read_to_end(&mut events_bytes)?;
        let events = ReplayEventsData::parse(&events_bytes)?;

        debug!(
            "Parsed local replay by '{}' ({} ticks, {} compressed event bytes)",
            header.username,
            events.tick_count(),
            compressed.len()
        );

        Ok(Self { header, events })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, LocalReplayError> {
        let events_bytes = self.events.to_bytes()?;
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&events_bytes)?;
        let compressed = encoder.finish()?;

        let mut out = Vec::new();
        self.header.write(&mut out);
        out.put_blob(&compressed);
        Ok(out)
    }
}
