use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::fs::{config_dir, state_dir};

const FILE_NAME: &str = "core.toml";

/// Storage key the snapshot is written under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "servers";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// The library's core configuration, serialized to TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Directory snapshots are stored in. Falls back to the XDG state directory.
    pub storage_dir: Option<PathBuf>,
    /// Key the record snapshot is stored under.
    pub storage_key: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            storage_key: DEFAULT_STORAGE_KEY.into(),
        }
    }
}

impl CoreConfig {
    /// Load the configuration from the rackbook config directory, writing out the defaults
    /// if no file exists yet.
    pub fn load() -> crate::Result<Self> {
        Ok(Self::load_from(&config_dir()?.join(FILE_NAME))?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

            Ok(toml::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring unparsable config {}: {err}", path.display());
                Self::default()
            }))
        } else {
            let cfg = Self::default();
            cfg.save_to(path)?;
            Ok(cfg)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        fs::write(path, contents).map_err(io_err)
    }

    /// Resolve the directory snapshots should be stored in.
    pub fn storage_dir(&self) -> crate::Result<PathBuf> {
        match &self.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(state_dir()?),
        }
    }
}

#[cfg(test)]
mod test {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(FILE_NAME);

        let cfg = CoreConfig::load_from(&path).unwrap();

        assert_eq!(cfg, CoreConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);

        let cfg = CoreConfig {
            storage_dir: Some(dir.path().join("data")),
            storage_key: "lab".into(),
        };
        cfg.save_to(&path).unwrap();

        assert_eq!(CoreConfig::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn test_unparsable_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        fs::write(&path, "storage_key = [not toml").unwrap();

        assert_eq!(CoreConfig::load_from(&path).unwrap(), CoreConfig::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        fs::write(&path, "storage_key = \"lab\"\n").unwrap();

        let cfg = CoreConfig::load_from(&path).unwrap();

        assert_eq!(cfg.storage_key, "lab");
        assert_eq!(cfg.storage_dir, None);
    }

    #[test]
    fn test_storage_dir_override() {
        let cfg = CoreConfig {
            storage_dir: Some(PathBuf::from("/srv/rackbook")),
            ..Default::default()
        };

        assert_eq!(cfg.storage_dir().unwrap(), PathBuf::from("/srv/rackbook"));
    }
}
