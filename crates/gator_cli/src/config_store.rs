//! JSON config file in the user's home directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gator_core::{Config, ConfigError, ConfigStore};
use gator_engine::{AtomicFileWriter, PersistError};
use gator_logging::gator_debug;

pub const CONFIG_FILENAME: &str = ".gatorconfig.json";

#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `~/.gatorconfig.json`
    pub fn at_default_location() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeDirUnavailable)?;
        Ok(Self::new(home.join(CONFIG_FILENAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> Result<Config, ConfigError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigError::Missing(self.path.clone()));
            }
            Err(err) => {
                return Err(ConfigError::Io {
                    path: self.path.clone(),
                    source: err,
                });
            }
        };

        let config = serde_json::from_str(&content).map_err(|err| ConfigError::Malformed {
            path: self.path.clone(),
            source: Box::new(err),
        })?;
        gator_debug!("loaded config from {:?}", self.path);
        Ok(config)
    }

    fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string(config).map_err(|err| ConfigError::Serialize(Box::new(err)))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let filename = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(CONFIG_FILENAME);

        AtomicFileWriter::new(dir)
            .write(filename, &content)
            .map_err(|err| ConfigError::Io {
                path: self.path.clone(),
                source: match err {
                    PersistError::Io(io) => io,
                    PersistError::OutputDir(message) => io::Error::other(message),
                },
            })?;
        gator_debug!("saved config to {:?}", self.path);
        Ok(())
    }
}
