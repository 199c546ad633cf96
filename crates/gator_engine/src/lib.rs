//! Gator engine: feed acquisition, decoding and normalization.
mod context;
mod decode;
mod engine;
mod fetch;
mod parse;
mod persist;
mod sanitize;
mod types;

pub use context::FetchContext;
pub use decode::{decode_text, DecodeError, DecodedText};
pub use engine::FeedEngine;
pub use fetch::{FeedSource, FetchSettings, ReqwestFetcher, DEFAULT_USER_AGENT};
pub use parse::parse_feed;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use sanitize::unescape_html;
pub use types::{
    FailureClass, FailureKind, Feed, FetchError, FetchMetadata, FetchOutput, Item,
};
