use std::error::Error as StdError;
use std::io;

use thiserror::Error;

use crate::{ConfigError, RepositoryError};

/// Failure of a single command. Each handler supplies its own context; the
/// registry passes errors through untouched.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("{0}")]
    Usage(String),
    #[error("account {0} doesn't exist")]
    AccountNotFound(String),
    #[error("{context}")]
    Config {
        context: &'static str,
        #[source]
        source: ConfigError,
    },
    #[error("{context}")]
    Repository {
        context: &'static str,
        #[source]
        source: RepositoryError,
    },
    #[error("{context}")]
    Fetch {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    #[error("failed to write command output")]
    Output(#[from] io::Error),
}

impl CommandError {
    pub fn repository(context: &'static str, source: RepositoryError) -> Self {
        Self::Repository { context, source }
    }

    pub fn config(context: &'static str, source: ConfigError) -> Self {
        Self::Config { context, source }
    }

    /// True for argument validation failures.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}
