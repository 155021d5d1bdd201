//! Shared binary formats for the Devil Daggers tools.
//!
//! Primitive little-endian codec, the asset container with its mesh, texture
//! and sound payloads, and MD5 content hashing.

pub mod binary;
pub mod error;
pub mod formats;
pub mod hash;
pub mod math;

pub use binary::{BinaryReader, ByteSink};
pub use error::FormatError;
pub use hash::{ContentHash, ContentHasher};
pub use math::I16Mat3;
