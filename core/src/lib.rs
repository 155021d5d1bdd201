//! Dagger Core - spawnsets, replays and game content
//!
//! This crate builds on the binary formats in `dagger-shared` with the
//! documents the tools edit.
//!
//! # Architecture
//!
//! - [`SpawnsetBinary`] - Level configuration, with [`SpawnsetEditor`] for undoable edits
//! - [`ReplayEventsData`] - Tick-indexed replay event stream
//! - [`EditorReplayModel`] - Per-kind replay timeline that compiles back to a stream
//! - [`GameContent`] - Survival spawnset and preview assets from a game installation

pub mod config;
pub mod content;
pub mod replay;
pub mod spawnset;

pub use config::{Config, ConfigError};
pub use content::{ContentError, GameContent, V3_SURVIVAL_HASH};
pub use replay::{
    EditorError, EditorEvent, EditorReplayModel, EntityIdPolicy, EventRecord, EventType, EventsError,
    LocalReplayBinary, LocalReplayError, ReplayEventsData,
};
pub use spawnset::{
    DefaultRules, GameRules, SpawnsView, SpawnsetBinary, SpawnsetCommand, SpawnsetEditor, SpawnsetError,
};
