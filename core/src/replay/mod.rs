//! Replays: tick-indexed event streams
//!
//! ```text
//! bytes ──read──▶ ReplayEventsData ──decompose──▶ EditorReplayModel
//!   ▲                                                   │ edit
//!   └──────write──── ReplayEventsData ◀──compile────────┘
//! ```
//!
//! - [`events`] defines the closed set of event records
//! - [`codec`] encodes and decodes single records
//! - [`ReplayEventsData`] holds a whole stream with its tick index
//! - [`LocalReplayBinary`] is the `.ddreplay` file written by the game
//! - [`editor::EditorReplayModel`] splits a stream into per-kind collections
//!   and compiles it back

pub mod codec;
pub mod editor;
pub mod events;
pub mod events_data;
pub mod local;

pub use editor::{EditorError, EditorEvent, EditorReplayModel, EntityIdPolicy, EventRef, RemovedEvent};
pub use events::{EntityType, EventRecord, EventType};
pub use events_data::ReplayEventsData;
pub use local::{LocalReplayBinary, LocalReplayError, LocalReplayHeader};

use dagger_shared::FormatError;

/// Errors from decoding or validating an event stream
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EventsError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("unknown event tag 0x{tag:02X} at offset {offset}")]
    UnknownEventTag { offset: usize, tag: u8 },

    #[error("unknown spawn tag 0x{tag:02X} at offset {offset}")]
    UnknownSpawnTag { offset: usize, tag: u8 },

    #[error("inputs record not terminated at offset {offset} (found 0x{value:02X}, expected 0x0A)")]
    InvalidInputsTerminator { offset: usize, value: u8 },

    #[error("event stream has no end record")]
    MissingEnd,

    #[error("{count} trailing bytes after end record at offset {offset}")]
    TrailingData { offset: usize, count: usize },

    #[error("{count} events after the last inputs record are not closed by a tick")]
    UnterminatedTick { count: usize },

    #[error("initial inputs record at event {index} is not the first inputs record")]
    MisplacedInitialInputs { index: usize },

    #[error("first inputs record at event {index} carries no look speed")]
    MissingInitialInputs { index: usize },

    #[error("end record at event {index} is not the last event")]
    MisplacedEnd { index: usize },
}
