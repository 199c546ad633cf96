use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The persisted client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub db_url: String,
    #[serde(default)]
    pub current_user_name: String,
}

impl Config {
    pub fn new(db_url: impl Into<String>) -> Self {
        Self {
            db_url: db_url.into(),
            current_user_name: String::new(),
        }
    }

    /// Returns a copy with the current user replaced.
    pub fn with_user(&self, name: impl Into<String>) -> Self {
        Self {
            db_url: self.db_url.clone(),
            current_user_name: name.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the home directory")]
    HomeDirUnavailable,
    #[error("config file {0:?} does not exist")]
    Missing(PathBuf),
    #[error("could not access config file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config file {path:?} is malformed")]
    Malformed {
        path: PathBuf,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    #[error("could not serialize config")]
    Serialize(#[source] Box<dyn StdError + Send + Sync>),
}

/// Loads and saves the configuration document.
pub trait ConfigStore {
    fn load(&self) -> Result<Config, ConfigError>;

    /// Writes the whole document; either succeeds or leaves the previous one.
    fn save(&self, config: &Config) -> Result<(), ConfigError>;
}
