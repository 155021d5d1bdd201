//! Asset container commands

use anyhow::{Context, Result};
use clap::Subcommand;
use dagger_shared::formats::{AssetType, MeshContent, ModBinary, ReadFilter, SoundContent, TextureContent};
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum AssetsAction {
    /// List the table of contents
    List {
        /// Asset container (`res/dd` or `res/audio`)
        file: PathBuf,

        /// Decode meshes, textures and sounds and show their dimensions
        #[arg(short, long)]
        decode: bool,
    },
}

pub fn execute(action: AssetsAction) -> Result<()> {
    match action {
        AssetsAction::List { file, decode } => list(&file, decode),
    }
}

fn list(path: &Path, decode: bool) -> Result<()> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read asset container: {}", path.display()))?;
    let container = ModBinary::parse(&data, &ReadFilter::All)
        .with_context(|| format!("Invalid asset container: {}", path.display()))?;

    println!("{} ({} entries, {} loaded)", path.display(), container.toc().len(), container.len());
    println!("  {:<8} {:<32} {:>10}", "Type", "Name", "Size");

    for entry in container.toc() {
        let type_name = match AssetType::from_code(entry.type_code) {
            Some(asset_type) => asset_type.to_string(),
            None => format!("0x{:02x}", entry.type_code),
        };

        let details = match (decode, entry.key()) {
            (true, Some(key)) => container
                .get(key.asset_type, &key.name)
                .map(|asset| describe(key.asset_type, &key.name, &asset.buffer))
                .unwrap_or_default(),
            _ => String::new(),
        };

        println!("  {:<8} {:<32} {:>10}  {}", type_name, entry.name, entry.size, details);
    }

    Ok(())
}

fn describe(asset_type: AssetType, name: &str, buffer: &[u8]) -> String {
    let described = match asset_type {
        AssetType::Mesh => MeshContent::parse(name, buffer).map(|mesh| {
            let status = match mesh.validate_indices() {
                Ok(()) => String::new(),
                Err(e) => format!(" ({e})"),
            };
            format!("{} vertices, {} indices{}", mesh.vertices.len(), mesh.indices.len(), status)
        }),
        AssetType::Texture => {
            TextureContent::parse(name, buffer).map(|texture| format!("{}x{}", texture.width, texture.height))
        }
        AssetType::Audio => SoundContent::parse(name, buffer).map(|sound| {
            format!(
                "{} ch, {} Hz, {:.2}s",
                sound.channels,
                sound.sample_rate,
                sound.duration_secs()
            )
        }),
    };
    described.unwrap_or_else(|e| format!("error: {e}"))
}
