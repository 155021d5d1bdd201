//! MD5 content hashing.
//!
//! Used to check a game installation against a known survival file, to detect
//! real spawnset changes for the edit history, and to de-duplicate replays.

use crate::binary::ByteSink;
use md5::{Digest, Md5};
use std::fmt;
use std::str::FromStr;

/// 16-byte MD5 digest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash(pub [u8; 16]);

impl ContentHash {
    pub fn of(data: &[u8]) -> Self {
        Self(Md5::digest(data).into())
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseHashError {
    #[error("invalid hex digest: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("digest must be 16 bytes, got {0}")]
    Length(usize),
}

impl FromStr for ContentHash {
    type Err = ParseHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim())?;
        let array: [u8; 16] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| ParseHashError::Length(bytes.len()))?;
        Ok(Self(array))
    }
}

/// Streaming hasher that accepts the same writes as an encode buffer
#[derive(Default)]
pub struct ContentHasher {
    inner: Md5,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> ContentHash {
        ContentHash(self.inner.finalize().into())
    }
}

impl ByteSink for ContentHasher {
    fn put_u8(&mut self, v: u8) {
        self.inner.update([v]);
    }

    fn put_bytes(&mut self, v: &[u8]) {
        self.inner.update(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(ContentHash::of(b"").to_hex(), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(ContentHash::of(b"abc").to_hex(), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_streaming_matches_oneshot() {
        let mut hasher = ContentHasher::new();
        hasher.put_i32(7);
        hasher.put_f32(1.5);

        let mut buffer = Vec::new();
        buffer.put_i32(7);
        buffer.put_f32(1.5);

        assert_eq!(hasher.finish(), ContentHash::of(&buffer));
    }

    #[test]
    fn test_parse_hex() {
        let hash: ContentHash = "900150983CD24FB0D6963F7D28E17F72".parse().unwrap();
        assert_eq!(hash, ContentHash::of(b"abc"));
        assert_eq!("abcd".parse::<ContentHash>(), Err(ParseHashError::Length(2)));
        assert!("zz".parse::<ContentHash>().is_err());
    }
}
