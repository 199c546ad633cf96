//! One invocation: config, repository, registry, dispatch.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use gator_core::{Command, ConfigStore, SessionState};
use gator_engine::{FeedEngine, FetchSettings};
use gator_logging::gator_debug;

use crate::{build_registry, AggOptions, JsonConfigStore, SqliteUserRepository};

#[derive(Debug, Clone, Default)]
pub struct StartOptions {
    /// Overrides `~/.gatorconfig.json`.
    pub config_path: Option<PathBuf>,
    pub fetch: FetchSettings,
    pub agg: AggOptions,
}

/// Runs the command named by `words` (everything after the program name).
///
/// Stages run strictly in order and the first failure ends the invocation:
/// config load, repository open, registry build, dispatch.
pub fn start(options: &StartOptions, words: &[String], out: Box<dyn Write>) -> Result<()> {
    let command = Command::from_words(words)
        .ok_or_else(|| anyhow!("not enough arguments were provided; usage: gator <command> [args...]"))?;

    let store = match &options.config_path {
        Some(path) => JsonConfigStore::new(path.clone()),
        None => JsonConfigStore::at_default_location().context("locating config file")?,
    };
    let config = store.load().context("loading config")?;
    gator_debug!("stage: config loaded from {:?}", store.path());

    let repository = SqliteUserRepository::open(&config.db_url).context("opening database")?;
    gator_debug!("stage: repository opened");

    let mut state = SessionState::new(Box::new(repository), config, Box::new(store)).with_output(out);

    let engine = FeedEngine::new(options.fetch.clone()).context("starting feed engine")?;
    let registry = build_registry(engine, options.agg.clone());
    gator_debug!("stage: registry built with {:?}", registry.names());

    let result = registry.run(&mut state, &command);
    state.out().flush().context("flushing output")?;
    result?;
    Ok(())
}
