//! Game content loaded from a Devil Daggers installation
//!
//! [`GameContent`] is an owned value: callers load it once and pass it to
//! whatever needs the survival spawnset or the preview assets.

use crate::spawnset::{SpawnsetBinary, SpawnsetError};
use dagger_shared::formats::{
    AssetKey, AssetType, MeshContent, ModBinary, ReadFilter, SoundContent, TextureContent,
};
use dagger_shared::{ContentHash, FormatError};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const SURVIVAL_PATH: &str = "dd/survival";
pub const RES_DD_PATH: &str = "res/dd";
pub const RES_AUDIO_PATH: &str = "res/audio";
pub const MODS_SURVIVAL_PATH: &str = "mods/survival";

#[cfg(windows)]
pub const EXECUTABLE_NAME: &str = "dd.exe";
#[cfg(not(windows))]
pub const EXECUTABLE_NAME: &str = "devildaggers";

/// Assets read from `res/dd`: `(type, name, flip vertically)`
pub const DD_ASSETS: &[(AssetType, &str, bool)] = &[
    (AssetType::Texture, "iconmaskcrosshair", true),
    (AssetType::Texture, "iconmaskdagger", true),
    (AssetType::Texture, "iconmaskgem", true),
    (AssetType::Texture, "iconmaskhoming", true),
    (AssetType::Texture, "iconmaskskull", true),
    (AssetType::Texture, "iconmaskstopwatch", true),
    (AssetType::Mesh, "dagger", false),
    (AssetType::Texture, "daggersilver", false),
    (AssetType::Mesh, "boid4", false),
    (AssetType::Texture, "boid4", false),
    (AssetType::Mesh, "boid4jaw", false),
    (AssetType::Texture, "boid4jaw", false),
    (AssetType::Mesh, "tile", false),
    (AssetType::Texture, "tile", false),
    (AssetType::Mesh, "pillar", false),
    (AssetType::Texture, "pillar", false),
    (AssetType::Texture, "post_lut", false),
    (AssetType::Mesh, "hand4", false),
    (AssetType::Texture, "hand6", false),
];

/// MD5 of the V3 `dd/survival` file shipped with the game
pub const V3_SURVIVAL_HASH: ContentHash = ContentHash([
    0x56, 0x9F, 0xEA, 0xD8, 0x7A, 0xBF, 0x4D, 0x30, 0xFD, 0xEE, 0x42, 0x31, 0xA6, 0x39, 0x80, 0x51,
]);

/// Assets read from `res/audio`
pub const AUDIO_ASSETS: &[&str] = &["jump1", "jump2", "jump3"];

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Installation directory {0} does not exist.")]
    MissingInstallation(PathBuf),

    #[error("Executable {0} does not exist.")]
    MissingExecutable(PathBuf),

    #[error("File '{0}' does not exist.")]
    MissingFile(&'static str),

    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("File 'dd/survival' could not be parsed: {0}")]
    InvalidSurvival(#[from] SpawnsetError),

    #[error("File 'dd/survival' is invalid (MD5 {actual}, expected {expected}). Validate your game files and try again.")]
    SurvivalHashMismatch {
        expected: ContentHash,
        actual: ContentHash,
    },

    #[error("There must not be a directory named 'survival' in the 'mods' directory.")]
    ModsSurvivalDirectory,

    #[error("File '{file}' is not a valid asset container: {source}")]
    InvalidContainer {
        file: &'static str,
        source: FormatError,
    },

    #[error("Required {asset_type} '{name}' from '{file}' was not found.")]
    MissingAsset {
        asset_type: AssetType,
        name: &'static str,
        file: &'static str,
    },

    #[error("Required {asset_type} '{name}' from '{file}' was not in a valid format: {source}")]
    InvalidAsset {
        asset_type: AssetType,
        name: &'static str,
        file: &'static str,
        source: FormatError,
    },
}

/// Everything the tools need from the game files
#[derive(Debug, Clone)]
pub struct GameContent {
    pub default_spawnset: SpawnsetBinary,
    pub icon_mask_crosshair_texture: TextureContent,
    pub icon_mask_dagger_texture: TextureContent,
    pub icon_mask_gem_texture: TextureContent,
    pub icon_mask_homing_texture: TextureContent,
    pub icon_mask_skull_texture: TextureContent,
    pub icon_mask_stopwatch_texture: TextureContent,
    pub dagger_mesh: MeshContent,
    pub dagger_silver_texture: TextureContent,
    pub skull4_mesh: MeshContent,
    pub skull4_texture: TextureContent,
    pub skull4_jaw_mesh: MeshContent,
    pub skull4_jaw_texture: TextureContent,
    pub tile_mesh: MeshContent,
    pub tile_texture: TextureContent,
    pub pillar_mesh: MeshContent,
    pub pillar_texture: TextureContent,
    pub post_lut: TextureContent,
    pub hand4_mesh: MeshContent,
    pub hand4_texture: TextureContent,
    pub sound_jump1: SoundContent,
    pub sound_jump2: SoundContent,
    pub sound_jump3: SoundContent,
}

impl GameContent {
    /// Validate an installation and load its content
    ///
    /// The MD5 of `dd/survival` must equal `expected_survival`, normally
    /// [`V3_SURVIVAL_HASH`].
    pub fn load(installation_dir: &Path, expected_survival: ContentHash) -> Result<Self, ContentError> {
        if !installation_dir.is_dir() {
            return Err(ContentError::MissingInstallation(installation_dir.to_path_buf()));
        }

        let executable = installation_dir.join(EXECUTABLE_NAME);
        if !executable.is_file() {
            return Err(ContentError::MissingExecutable(executable));
        }

        let survival = read_required(installation_dir, SURVIVAL_PATH)?;
        let audio = read_required(installation_dir, RES_AUDIO_PATH)?;
        let dd = read_required(installation_dir, RES_DD_PATH)?;

        if installation_dir.join(MODS_SURVIVAL_PATH).is_dir() {
            return Err(ContentError::ModsSurvivalDirectory);
        }

        let content = Self::from_bytes(&survival, &dd, &audio, expected_survival)?;
        info!("Loaded game content from {}", installation_dir.display());
        Ok(content)
    }

    /// Build content from the raw survival, `res/dd` and `res/audio` files
    pub fn from_bytes(
        survival: &[u8],
        dd: &[u8],
        audio: &[u8],
        expected_survival: ContentHash,
    ) -> Result<Self, ContentError> {
        let default_spawnset = SpawnsetBinary::parse(survival)?;

        let actual = ContentHash::of(survival);
        if actual != expected_survival {
            return Err(ContentError::SurvivalHashMismatch {
                expected: expected_survival,
                actual,
            });
        }

        let dd_filter = ReadFilter::assets(
            DD_ASSETS
                .iter()
                .map(|&(asset_type, name, _)| AssetKey::new(asset_type, name)),
        );
        let audio_filter =
            ReadFilter::assets(AUDIO_ASSETS.iter().map(|&name| AssetKey::new(AssetType::Audio, name)));

        let dd = ModBinary::parse(dd, &dd_filter).map_err(|source| ContentError::InvalidContainer {
            file: RES_DD_PATH,
            source,
        })?;
        let audio = ModBinary::parse(audio, &audio_filter).map_err(|source| ContentError::InvalidContainer {
            file: RES_AUDIO_PATH,
            source,
        })?;

        Ok(Self {
            default_spawnset,
            icon_mask_crosshair_texture: texture(&dd, "iconmaskcrosshair", true)?,
            icon_mask_dagger_texture: texture(&dd, "iconmaskdagger", true)?,
            icon_mask_gem_texture: texture(&dd, "iconmaskgem", true)?,
            icon_mask_homing_texture: texture(&dd, "iconmaskhoming", true)?,
            icon_mask_skull_texture: texture(&dd, "iconmaskskull", true)?,
            icon_mask_stopwatch_texture: texture(&dd, "iconmaskstopwatch", true)?,
            dagger_mesh: mesh(&dd, "dagger")?,
            dagger_silver_texture: texture(&dd, "daggersilver", false)?,
            skull4_mesh: mesh(&dd, "boid4")?,
            skull4_texture: texture(&dd, "boid4", false)?,
            skull4_jaw_mesh: mesh(&dd, "boid4jaw")?,
            skull4_jaw_texture: texture(&dd, "boid4jaw", false)?,
            tile_mesh: mesh(&dd, "tile")?,
            tile_texture: texture(&dd, "tile", false)?,
            pillar_mesh: mesh(&dd, "pillar")?,
            pillar_texture: texture(&dd, "pillar", false)?,
            post_lut: texture(&dd, "post_lut", false)?,
            hand4_mesh: mesh(&dd, "hand4")?,
            hand4_texture: texture(&dd, "hand6", false)?,
            sound_jump1: sound(&audio, "jump1")?,
            sound_jump2: sound(&audio, "jump2")?,
            sound_jump3: sound(&audio, "jump3")?,
        })
    }
}

fn read_required(installation_dir: &Path, relative: &'static str) -> Result<Vec<u8>, ContentError> {
    let path = installation_dir.join(relative);
    if !path.is_file() {
        return Err(ContentError::MissingFile(relative));
    }
    std::fs::read(&path).map_err(|source| ContentError::Read { path, source })
}

fn payload<'a>(
    container: &'a ModBinary,
    asset_type: AssetType,
    name: &'static str,
    file: &'static str,
) -> Result<&'a [u8], ContentError> {
    container
        .get(asset_type, name)
        .map(|data| data.buffer.as_slice())
        .ok_or(ContentError::MissingAsset { asset_type, name, file })
}

fn mesh(dd: &ModBinary, name: &'static str) -> Result<MeshContent, ContentError> {
    let data = payload(dd, AssetType::Mesh, name, RES_DD_PATH)?;
    MeshContent::parse(name, data).map_err(|source| ContentError::InvalidAsset {
        asset_type: AssetType::Mesh,
        name,
        file: RES_DD_PATH,
        source,
    })
}

fn texture(dd: &ModBinary, name: &'static str, flip_vertically: bool) -> Result<TextureContent, ContentError> {
    let data = payload(dd, AssetType::Texture, name, RES_DD_PATH)?;
    let mut texture = TextureContent::parse(name, data).map_err(|source| ContentError::InvalidAsset {
        asset_type: AssetType::Texture,
        name,
        file: RES_DD_PATH,
        source,
    })?;
    if flip_vertically {
        texture.flip_vertical();
    }
    Ok(texture)
}

fn sound(audio: &ModBinary, name: &'static str) -> Result<SoundContent, ContentError> {
    let data = payload(audio, AssetType::Audio, name, RES_AUDIO_PATH)?;
    SoundContent::parse(name, data).map_err(|source| {
        warn!("Could not parse .wav file {name}: {source}");
        ContentError::InvalidAsset {
            asset_type: AssetType::Audio,
            name,
            file: RES_AUDIO_PATH,
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagger_shared::formats::{MeshHeader, TextureHeader};
    use std::io::Cursor;

    fn texture_bytes() -> Vec<u8> {
        // 1x2: top row red, bottom row blue
        let mut bytes = TextureHeader::new(1, 2, 0).to_bytes().to_vec();
        bytes.extend_from_slice(&[255, 0, 0, 255, 0, 0, 255, 255]);
        bytes
    }

    fn wav_bytes() -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut buffer = Vec::new();
        {
            let mut writer = hound::WavWriter::new(Cursor::new(&mut buffer), spec).unwrap();
            writer.write_sample(0i16).unwrap();
            writer.finalize().unwrap();
        }
        buffer
    }

    fn dd_container(skip: Option<&str>) -> Vec<u8> {
        let mesh = MeshHeader::new(0, 0).to_bytes().to_vec();
        let texture = texture_bytes();
        let keys: Vec<(AssetKey, &[u8])> = DD_ASSETS
            .iter()
            .filter(|(_, name, _)| Some(*name) != skip)
            .map(|&(asset_type, name, _)| {
                let payload: &[u8] = match asset_type {
                    AssetType::Mesh => &mesh,
                    _ => &texture,
                };
                (AssetKey::new(asset_type, name), payload)
            })
            .collect();
        ModBinary::build(keys.iter().map(|(k, p)| (k, *p)))
    }

    fn audio_container(jump3: &[u8]) -> Vec<u8> {
        let wav = wav_bytes();
        let keys = [
            (AssetKey::new(AssetType::Audio, "jump1"), wav.as_slice()),
            (AssetKey::new(AssetType::Audio, "jump2"), wav.as_slice()),
            (AssetKey::new(AssetType::Audio, "jump3"), jump3),
        ];
        ModBinary::build(keys.iter().map(|(k, p)| (k, *p)))
    }

    /// Hash of the stand-in survival file written by the fixtures
    fn survival_hash() -> ContentHash {
        ContentHash::of(&SpawnsetBinary::default().to_bytes())
    }

    fn write_installation(dir: &Path) {
        std::fs::create_dir_all(dir.join("dd")).unwrap();
        std::fs::create_dir_all(dir.join("res")).unwrap();
        std::fs::write(dir.join(EXECUTABLE_NAME), b"").unwrap();
        std::fs::write(dir.join(SURVIVAL_PATH), SpawnsetBinary::default().to_bytes()).unwrap();
        std::fs::write(dir.join(RES_DD_PATH), dd_container(None)).unwrap();
        std::fs::write(dir.join(RES_AUDIO_PATH), audio_container(&wav_bytes())).unwrap();
    }

    #[test]
    fn test_load_installation() {
        let dir = tempfile::tempdir().unwrap();
        write_installation(dir.path());

        let content = GameContent::load(dir.path(), survival_hash()).unwrap();

        assert_eq!(content.default_spawnset, SpawnsetBinary::default());
        assert_eq!(content.sound_jump2.sample_rate, 44100);
        // Icon masks are flipped, other textures are not
        assert_eq!(&content.icon_mask_gem_texture.pixels[..4], &[0, 0, 255, 255]);
        assert_eq!(&content.tile_texture.pixels[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_missing_pieces() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            GameContent::load(&dir.path().join("nope"), V3_SURVIVAL_HASH),
            Err(ContentError::MissingInstallation(_))
        ));
        assert!(matches!(
            GameContent::load(dir.path(), V3_SURVIVAL_HASH),
            Err(ContentError::MissingExecutable(_))
        ));

        write_installation(dir.path());
        std::fs::remove_file(dir.path().join(RES_AUDIO_PATH)).unwrap();
        assert!(matches!(
            GameContent::load(dir.path(), V3_SURVIVAL_HASH),
            Err(ContentError::MissingFile(RES_AUDIO_PATH))
        ));
    }

    #[test]
    fn test_mods_survival_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_installation(dir.path());
        std::fs::create_dir_all(dir.path().join(MODS_SURVIVAL_PATH)).unwrap();
        assert!(matches!(
            GameContent::load(dir.path(), V3_SURVIVAL_HASH),
            Err(ContentError::ModsSurvivalDirectory)
        ));
    }

    #[test]
    fn test_survival_hash_mismatch() {
        let survival = SpawnsetBinary::default().to_bytes();
        let result = GameContent::from_bytes(
            &survival,
            &dd_container(None),
            &audio_container(&wav_bytes()),
            V3_SURVIVAL_HASH,
        );
        assert!(matches!(
            result,
            Err(ContentError::SurvivalHashMismatch {
                expected: V3_SURVIVAL_HASH,
                ..
            })
        ));
    }

    #[test]
    fn test_v3_survival_hash() {
        assert_eq!(V3_SURVIVAL_HASH.to_hex(), "569fead87abf4d30fdee4231a6398051");
    }

    #[test]
    fn test_missing_required_asset() {
        let survival = SpawnsetBinary::default().to_bytes();
        let err = GameContent::from_bytes(&survival, &dd_container(Some("pillar")), &audio_container(&wav_bytes()), survival_hash())
            .unwrap_err();
        assert_eq!(err.to_string(), "Required mesh 'pillar' from 'res/dd' was not found.");
    }

    #[test]
    fn test_invalid_audio() {
        let survival = SpawnsetBinary::default().to_bytes();
        let err = GameContent::from_bytes(&survival, &dd_container(None), &audio_container(b"not a wav"), survival_hash())
            .unwrap_err();
        assert!(matches!(
            err,
            ContentError::InvalidAsset {
                asset_type: AssetType::Audio,
                name: "jump3",
                ..
            }
        ));
    }
}
