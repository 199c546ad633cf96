//! Gator: a command-line RSS feed aggregator.
pub mod app;
pub mod config_store;
pub mod handlers;
pub mod storage;

pub use app::{start, StartOptions};
pub use config_store::{JsonConfigStore, CONFIG_FILENAME};
pub use handlers::{build_registry, AggOptions, DEFAULT_FEED_URL};
pub use storage::SqliteUserRepository;
