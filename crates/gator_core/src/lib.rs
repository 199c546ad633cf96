//! Gator core: command dispatch over an explicitly owned session.
mod command;
mod config;
mod error;
mod registry;
mod repository;
mod state;

pub use command::Command;
pub use config::{Config, ConfigError, ConfigStore};
pub use error::CommandError;
pub use registry::{CommandRegistry, Handler};
pub use repository::{NewUser, RepositoryError, User, UserRepository};
pub use state::SessionState;
