//! Configuration management (config.toml)
//!
//! Settings are stored in TOML format in the platform-specific config
//! directory. Every field has a default so partial files load.

use crate::content::V3_SURVIVAL_HASH;
use dagger_shared::ContentHash;
use dagger_shared::hash::ParseHashError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no config directory available on this platform")]
    NoConfigDir,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Game installation settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameConfig {
    /// Root of the game installation (default: unset)
    #[serde(default)]
    pub installation_directory: Option<PathBuf>,
    /// Hex MD5 the survival spawnset must match (default: the V3 survival file)
    #[serde(default)]
    pub survival_md5: Option<String>,
}

impl GameConfig {
    /// Expected MD5 of `dd/survival`
    pub fn survival_hash(&self) -> Result<ContentHash, ParseHashError> {
        match &self.survival_md5 {
            Some(hex) => hex.parse(),
            None => Ok(V3_SURVIVAL_HASH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter directive, overridden by `RUST_LOG` (default: info)
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

/// Platform-specific configuration directory
///
/// On Windows: `%APPDATA%\DevilDaggersTools\config`
/// On macOS: `~/Library/Application Support/info.devildaggers.DevilDaggersTools`
/// On Linux: `~/.config/devildaggerstools`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("info", "devildaggers", "DevilDaggersTools")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Default config file location
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

impl Config {
    /// Load from an explicit path; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the platform config directory
    ///
    /// Falls back to defaults if the file is missing or invalid.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        Self::load_from(&path).unwrap_or_else(|e| {
            tracing::warn!("Using default config: {e}");
            Self::default()
        })
    }

    /// Write to an explicit path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(write_error)
    }

    /// Write to the platform config directory
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.game.installation_directory.is_none());
        assert!(config.game.survival_md5.is_none());
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_deserialize_partial_game() {
        let toml_str = r#"
[game]
installation_directory = "/games/devildaggers"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.game.installation_directory.as_deref(),
            Some(Path::new("/games/devildaggers"))
        );
        assert_eq!(config.log.filter, "info"); // default
    }

    #[test]
    fn test_survival_hash_defaults_to_v3() {
        let mut game = GameConfig::default();
        assert_eq!(game.survival_hash(), Ok(V3_SURVIVAL_HASH));

        game.survival_md5 = Some("00112233445566778899aabbccddeeff".to_string());
        assert_eq!(game.survival_hash().unwrap().as_bytes()[1], 0x11);

        game.survival_md5 = Some("abc".to_string());
        assert!(game.survival_hash().is_err());
    }

    #[test]
    fn test_save_and_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let config = Config {
            game: GameConfig {
                installation_directory: Some(PathBuf::from("dd")),
                survival_md5: Some("569fead87abf4d30fdee4231a6398051".to_string()),
            },
            log: LogConfig {
                filter: "dagger_core=debug".to_string(),
            },
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[game\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse { .. })));
    }
}
