//! Tests for reading game assets out of an asset container.

use dagger_shared::formats::*;

fn mesh_payload() -> Vec<u8> {
    let mut data = vec![0u8; 118];
    data[0..4].copy_from_slice(&3i32.to_le_bytes());
    data[4..8].copy_from_slice(&3i32.to_le_bytes());
    data
}

fn texture_payload(width: i32, height: i32) -> Vec<u8> {
    let mut data = TextureHeader::new(width, height, 1).to_bytes().to_vec();
    data.resize(TextureHeader::SIZE + (width * height * 4) as usize, 0x7F);
    data
}

#[test]
fn test_sparse_read_ignores_corrupt_unrequested_entry() {
    let a = AssetKey::new(AssetType::Mesh, "a");
    let b = AssetKey::new(AssetType::Texture, "b");
    let c = AssetKey::new(AssetType::Texture, "c");

    let mesh = mesh_payload();
    let texture = texture_payload(2, 2);
    let mut data = ModBinary::build([
        (&a, mesh.as_slice()),
        (&b, texture.as_slice()),
        (&c, texture.as_slice()),
    ]);

    // Point B's payload past the end of the file: TOC entry 2 starts after
    // entry 1 (2 + "a\0" + 12 bytes), its offset field follows "b\0".
    let entry_b = MOD_BINARY_HEADER_SIZE + (2 + 2 + 12);
    let offset_field = entry_b + 2 + 2;
    data[offset_field..offset_field + 4].copy_from_slice(&u32::MAX.to_le_bytes());

    assert!(matches!(
        ModBinary::parse(&data, &ReadFilter::All),
        Err(dagger_shared::FormatError::PayloadOutOfBounds { .. })
    ));

    let binary = ModBinary::parse(&data, &ReadFilter::assets([a.clone(), c.clone()])).unwrap();
    let mut keys: Vec<_> = binary.asset_map().keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, vec![a, c]);
}

#[test]
fn test_decode_payloads_from_container() {
    let mesh_key = AssetKey::new(AssetType::Mesh, "dagger");
    let tex_key = AssetKey::new(AssetType::Texture, "tile");

    let mesh = mesh_payload();
    let texture = texture_payload(1, 2);
    let data = ModBinary::build([(&mesh_key, mesh.as_slice()), (&tex_key, texture.as_slice())]);
    let binary = ModBinary::parse(&data, &ReadFilter::All).unwrap();

    let mesh_data = binary.get(AssetType::Mesh, "dagger").unwrap();
    let mesh = MeshContent::parse("dagger", &mesh_data.buffer).unwrap();
    assert_eq!(mesh.vertices.len(), 3);
    assert!(mesh.validate_indices().is_ok());

    let tex_data = binary.get(AssetType::Texture, "tile").unwrap();
    let texture = TextureContent::parse("tile", &tex_data.buffer).unwrap();
    assert_eq!((texture.width, texture.height), (1, 2));
    assert_eq!(texture.pixels.len(), 8);
}
