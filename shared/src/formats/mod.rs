//! Game asset formats
//!
//! The asset container (`res/dd`, `res/audio`) indexes named payloads; mesh,
//! texture and sound payloads are decoded by the sibling modules.

pub mod mesh;
pub mod mod_binary;
pub mod sound;
pub mod texture;

pub use mesh::*;
pub use mod_binary::*;
pub use sound::*;
pub use texture::*;
