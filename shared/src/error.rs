//! Error type for the binary formats in this crate.

/// Structural parse failure.
///
/// Every variant names the asset or field that failed so the message can be
/// shown to a user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("unexpected end of data while reading '{field}' ({needed} bytes needed, {available} available)")]
    Truncated {
        field: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("invalid {what}: expected {expected:#X} but got {actual:#X}")]
    InvalidMagic {
        what: &'static str,
        expected: u32,
        actual: u32,
    },

    #[error("invalid data for {asset}: length was {actual} but should be at least {expected}")]
    TooShort {
        asset: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid header for texture '{name}': should be {expected} but got {actual}")]
    InvalidTextureHeader {
        name: String,
        expected: u16,
        actual: u16,
    },

    #[error("dimensions for {asset} cannot be negative ({width}x{height})")]
    NegativeDimensions {
        asset: String,
        width: i32,
        height: i32,
    },

    #[error("negative count for {asset}: {field} = {value}")]
    NegativeCount {
        asset: String,
        field: &'static str,
        value: i32,
    },

    #[error("payload of asset '{name}' is out of bounds (offset {offset}, size {size}, container length {len})")]
    PayloadOutOfBounds {
        name: String,
        offset: u32,
        size: u32,
        len: usize,
    },

    #[error("invalid string in '{field}': {reason}")]
    InvalidString { field: &'static str, reason: String },

    #[error("invalid wave data for '{name}': {reason}")]
    InvalidWave { name: String, reason: String },
}
