//! Asset container format (`res/dd`, `res/audio` and mod files)
//!
//! A container starts with two magic words and a table of contents. Each TOC
//! entry names one asset and points at its payload by absolute offset.
//!
//! # Layout
//! ```text
//! 0x00: magic1 u32 (0x3A68783A)
//! 0x04: magic2 u32 (0x72673A01)
//! 0x08: toc_size u32
//! 0x0C: toc entries, toc_size bytes in total:
//!       type u16, name (null-terminated ASCII), offset u32, size u32, reserved u32
//! var:  payloads
//! ```
//!
//! Parsing is sparse: only entries selected by the [`ReadFilter`] have their
//! payload bounds checked and copied, so one large container can be queried
//! cheaply and repeatedly with different filters.

use crate::binary::BinaryReader;
use crate::error::FormatError;
use hashbrown::{HashMap, HashSet};

pub const MOD_BINARY_MAGIC1: u32 = 0x3A68_783A;
pub const MOD_BINARY_MAGIC2: u32 = 0x7267_3A01;

/// Size of the fixed container header
pub const MOD_BINARY_HEADER_SIZE: usize = 12;

/// Asset kinds the tools care about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetType {
    Mesh,
    Texture,
    Audio,
}

impl AssetType {
    /// TOC type code, `None` for kinds that are always skipped (shaders, object bindings)
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0x01 => Some(Self::Mesh),
            0x02 => Some(Self::Texture),
            0x20 => Some(Self::Audio),
            _ => None,
        }
    }

    pub fn code(self) -> u16 {
        match self {
            Self::Mesh => 0x01,
            Self::Texture => 0x02,
            Self::Audio => 0x20,
        }
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Mesh => "mesh",
            Self::Texture => "texture",
            Self::Audio => "audio",
        };
        f.write_str(name)
    }
}

/// Identity of one asset in a container
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetKey {
    pub asset_type: AssetType,
    pub name: String,
}

impl AssetKey {
    pub fn new(asset_type: AssetType, name: impl Into<String>) -> Self {
        Self {
            asset_type,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for AssetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}'", self.asset_type, self.name)
    }
}

/// Owned payload of one asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetData {
    pub buffer: Vec<u8>,
}

/// Which TOC entries to materialize
#[derive(Debug, Clone, Default)]
pub enum ReadFilter {
    /// Every mesh, texture and audio entry
    #[default]
    All,
    /// Only the listed keys
    Assets(HashSet<AssetKey>),
}

impl ReadFilter {
    pub fn assets(keys: impl IntoIterator<Item = AssetKey>) -> Self {
        Self::Assets(keys.into_iter().collect())
    }

    pub fn contains(&self, key: &AssetKey) -> bool {
        match self {
            Self::All => true,
            Self::Assets(keys) => keys.contains(key),
        }
    }
}

/// One parsed table-of-contents entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Raw type code
    pub type_code: u16,
    pub name: String,
    pub offset: u32,
    pub size: u32,
}

impl TocEntry {
    pub fn key(&self) -> Option<AssetKey> {
        AssetType::from_code(self.type_code).map(|t| AssetKey::new(t, self.name.clone()))
    }
}

/// Parsed container holding the requested assets
#[derive(Debug, Clone, Default)]
pub struct ModBinary {
    toc: Vec<TocEntry>,
    assets: HashMap<AssetKey, AssetData>,
}

impl ModBinary {
    /// Parse a container, copying only the payloads selected by `filter`
    pub fn parse(data: &[u8], filter: &ReadFilter) -> Result<Self, FormatError> {
        let toc = read_toc(data)?;
        let mut assets = HashMap::new();

        for entry in &toc {
            let Some(key) = entry.key() else {
                continue;
            };
            if !filter.contains(&key) {
                continue;
            }

            let start = entry.offset as usize;
            let end = start.checked_add(entry.size as usize);
            let payload = end.and_then(|end| data.get(start..end)).ok_or_else(|| {
                FormatError::PayloadOutOfBounds {
                    name: entry.name.clone(),
                    offset: entry.offset,
                    size: entry.size,
                    len: data.len(),
                }
            })?;

            assets.insert(
                key,
                AssetData {
                    buffer: payload.to_vec(),
                },
            );
        }

        tracing::debug!(
            "Parsed asset container: {} TOC entries, {} assets materialized",
            toc.len(),
            assets.len()
        );

        Ok(Self { toc, assets })
    }

    /// Table of contents in file order, including entries that were not read
    pub fn toc(&self) -> &[TocEntry] {
        &self.toc
    }

    pub fn asset_map(&self) -> &HashMap<AssetKey, AssetData> {
        &self.assets
    }

    pub fn get(&self, asset_type: AssetType, name: &str) -> Option<&AssetData> {
        self.assets.get(&AssetKey::new(asset_type, name))
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Serialize a container from `(key, payload)` pairs, in the given order
    pub fn build<'a>(entries: impl IntoIterator<Item = (&'a AssetKey, &'a [u8])>) -> Vec<u8> {
        use crate::binary::ByteSink;

        let entries: Vec<_> = entries.into_iter().collect();
        let toc_size: usize = entries.iter().map(|(k, _)| 2 + k.name.len() + 1 + 12).sum();

        let mut out = Vec::new();
        out.put_u32(MOD_BINARY_MAGIC1);
        out.put_u32(MOD_BINARY_MAGIC2);
        out.put_u32(toc_size as u32);

        let mut offset = MOD_BINARY_HEADER_SIZE + toc_size;
        for (key, payload) in &entries {
            out.put_u16(key.asset_type.code());
            out.put_cstr(&key.name);
            out.put_u32(offset as u32);
            out.put_u32(payload.len() as u32);
            out.put_u32(0);
            offset += payload.len();
        }
        for (_, payload) in &entries {
            out.put_bytes(payload);
        }
        out
    }
}

fn read_toc(data: &[u8]) -> Result<Vec<TocEntry>, FormatError> {
    let mut reader = BinaryReader::new(data);

    let magic1 = reader.read_u32("magic1")?;
    if magic1 != MOD_BINARY_MAGIC1 {
        return Err(FormatError::InvalidMagic {
            what: "asset container magic1",
            expected: MOD_BINARY_MAGIC1,
            actual: magic1,
        });
    }
    let magic2 = reader.read_u32("magic2")?;
    if magic2 != MOD_BINARY_MAGIC2 {
        return Err(FormatError::InvalidMagic {
            what: "asset container magic2",
            expected: MOD_BINARY_MAGIC2,
            actual: magic2,
        });
    }

    let toc_size = reader.read_u32("toc_size")? as usize;
    reader.ensure("toc", toc_size)?;
    let toc_end = MOD_BINARY_HEADER_SIZE + toc_size;

    let mut entries = Vec::new();
    while reader.position() < toc_end {
        let type_code = reader.read_u16("toc entry type")?;
        let name = reader.read_cstr("toc entry name")?;
        let offset = reader.read_u32("toc entry offset")?;
        let size = reader.read_u32("toc entry size")?;
        reader.skip("toc entry reserved", 4)?;

        if AssetType::from_code(type_code).is_none() {
            tracing::trace!("Skipping TOC entry '{}' with type {:#06X}", name, type_code);
        }

        entries.push(TocEntry {
            type_code,
            name,
            offset,
            size,
        });
    }

    if reader.position() != toc_end {
        return Err(FormatError::TooShort {
            asset: "asset container table of contents".to_string(),
            expected: reader.position() - MOD_BINARY_HEADER_SIZE,
            actual: toc_size,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::ByteSink;

    fn key(t: AssetType, n: &str) -> AssetKey {
        AssetKey::new(t, n)
    }

    #[test]
    fn test_parse_all() {
        let a = key(AssetType::Mesh, "dagger");
        let b = key(AssetType::Texture, "tile");
        let data = ModBinary::build([(&a, &[1u8, 2, 3][..]), (&b, &[9u8][..])]);

        let binary = ModBinary::parse(&data, &ReadFilter::All).unwrap();
        assert_eq!(binary.len(), 2);
        assert_eq!(binary.get(AssetType::Mesh, "dagger").unwrap().buffer, vec![1, 2, 3]);
        assert_eq!(binary.get(AssetType::Texture, "tile").unwrap().buffer, vec![9]);
        assert_eq!(binary.toc().len(), 2);
    }

    #[test]
    fn test_same_name_different_type() {
        let mesh = key(AssetType::Mesh, "boid4");
        let tex = key(AssetType::Texture, "boid4");
        let data = ModBinary::build([(&mesh, &[1u8][..]), (&tex, &[2u8][..])]);

        let binary = ModBinary::parse(&data, &ReadFilter::assets([tex.clone()])).unwrap();
        assert_eq!(binary.len(), 1);
        assert!(binary.asset_map().contains_key(&tex));
        assert!(!binary.asset_map().contains_key(&mesh));
    }

    #[test]
    fn test_missing_key_is_not_an_error() {
        let a = key(AssetType::Audio, "jump1");
        let data = ModBinary::build([(&a, &[0u8; 4][..])]);

        let filter = ReadFilter::assets([key(AssetType::Audio, "jump2")]);
        let binary = ModBinary::parse(&data, &filter).unwrap();
        assert!(binary.is_empty());
        assert!(binary.get(AssetType::Audio, "jump2").is_none());
    }

    #[test]
    fn test_bad_magic() {
        let mut data = Vec::new();
        data.put_u32(0xDEAD_BEEF);
        data.put_u32(MOD_BINARY_MAGIC2);
        data.put_u32(0);
        assert!(matches!(
            ModBinary::parse(&data, &ReadFilter::All),
            Err(FormatError::InvalidMagic { actual: 0xDEAD_BEEF, .. })
        ));
    }

    #[test]
    fn test_truncated_toc() {
        let a = key(AssetType::Mesh, "dagger");
        let data = ModBinary::build([(&a, &[1u8][..])]);
        // Cut inside the table of contents
        assert!(ModBinary::parse(&data[..16], &ReadFilter::All).is_err());
    }

    #[test]
    fn test_unknown_type_codes_are_skipped() {
        let mut data = Vec::new();
        let name = "shader";
        let toc_size = 2 + name.len() + 1 + 12;
        data.put_u32(MOD_BINARY_MAGIC1);
        data.put_u32(MOD_BINARY_MAGIC2);
        data.put_u32(toc_size as u32);
        data.put_u16(0x10);
        data.put_cstr(name);
        // Offset far out of bounds; never read because the type is unknown
        data.put_u32(0xFFFF_0000);
        data.put_u32(100);
        data.put_u32(0);

        let binary = ModBinary::parse(&data, &ReadFilter::All).unwrap();
        assert!(binary.is_empty());
        assert_eq!(binary.toc()[0].type_code, 0x10);
    }
}
