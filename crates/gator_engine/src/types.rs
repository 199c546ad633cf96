use std::error::Error as StdError;
use std::fmt;

use crate::DecodeError;

/// A parsed RSS channel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Feed {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Items in source document order.
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Item {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Publication date exactly as written in the feed.
    pub published_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn with_source(
        kind: FailureKind,
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "context cancelled")
    }

    pub(crate) fn deadline_exceeded() -> Self {
        Self::new(FailureKind::DeadlineExceeded, "context deadline exceeded")
    }

    pub fn class(&self) -> FailureClass {
        self.kind.class()
    }
}

impl From<DecodeError> for FetchError {
    fn from(err: DecodeError) -> Self {
        Self::with_source(FailureKind::Decode, "response is not a readable feed", err)
    }
}

/// Which layer a fetch failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The request could not be built.
    Request,
    /// The server could not be reached or did not answer properly.
    Transport,
    /// The server answered with something that is not a feed.
    Decode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Client,
    HttpStatus(u16),
    Timeout,
    DeadlineExceeded,
    Cancelled,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
    Decode,
}

impl FailureKind {
    pub fn class(&self) -> FailureClass {
        match self {
            FailureKind::InvalidUrl | FailureKind::Client => FailureClass::Request,
            FailureKind::UnsupportedContentType { .. } | FailureKind::Decode => {
                FailureClass::Decode
            }
            FailureKind::HttpStatus(_)
            | FailureKind::Timeout
            | FailureKind::DeadlineExceeded
            | FailureKind::Cancelled
            | FailureKind::RedirectLimitExceeded
            | FailureKind::TooLarge { .. }
            | FailureKind::Network => FailureClass::Transport,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Client => write!(f, "http client error"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::DeadlineExceeded => write!(f, "deadline exceeded"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "decode error"),
        }
    }
}
