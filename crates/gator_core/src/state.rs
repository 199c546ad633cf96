use std::fmt;
use std::io::{self, Write};

use gator_logging::gator_debug;

use crate::{Config, ConfigError, ConfigStore, UserRepository};

/// Everything a handler may touch during one invocation.
pub struct SessionState {
    repository: Box<dyn UserRepository>,
    config: Config,
    config_store: Box<dyn ConfigStore>,
    out: Box<dyn Write>,
}

impl SessionState {
    /// Creates a session writing command output to stdout.
    pub fn new(
        repository: Box<dyn UserRepository>,
        config: Config,
        config_store: Box<dyn ConfigStore>,
    ) -> Self {
        Self {
            repository,
            config,
            config_store,
            out: Box::new(io::stdout()),
        }
    }

    pub fn with_output(mut self, out: Box<dyn Write>) -> Self {
        self.out = out;
        self
    }

    pub fn repository(&self) -> &dyn UserRepository {
        self.repository.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn out(&mut self) -> &mut dyn Write {
        self.out.as_mut()
    }

    /// Persists `name` as the current user, then adopts it in memory.
    ///
    /// On a failed save neither the file nor the in-memory config changes.
    pub fn set_current_user(&mut self, name: &str) -> Result<(), ConfigError> {
        let updated = self.config.with_user(name);
        self.config_store.save(&updated)?;
        gator_debug!("current user set to {}", name);
        self.config = updated;
        Ok(())
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
