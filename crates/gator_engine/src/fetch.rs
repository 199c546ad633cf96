use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use futures_util::StreamExt;
use gator_logging::{gator_debug, gator_info};
use reqwest::header::CONTENT_TYPE;

use crate::{
    decode_text, parse_feed, FailureKind, Feed, FetchContext, FetchError, FetchMetadata,
    FetchOutput,
};

pub const DEFAULT_USER_AGENT: &str = concat!("gator/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub user_agent: String,
    /// Accepted `Content-Type` values; empty (the default) accepts anything.
    pub allowed_content_types: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            allowed_content_types: Vec::new(),
        }
    }
}

/// Anything that can turn a feed URL into a normalized [`Feed`].
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_feed(&self, ctx: &FetchContext, url: &str) -> Result<Feed, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    fn build_client(&self, redirect_counter: Arc<AtomicUsize>) -> Result<reqwest::Client, FetchError> {
        let redirect_limit = self.settings.redirect_limit;
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            let count = attempt.previous().len();
            redirect_counter.store(count, Ordering::Relaxed);
            if count >= redirect_limit {
                attempt.error("redirect limit exceeded")
            } else {
                attempt.follow()
            }
        });

        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .user_agent(self.settings.user_agent.clone())
            .redirect(policy)
            .build()
            .map_err(|err| FetchError::with_source(FailureKind::Client, "could not build http client", err))
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        if self.settings.allowed_content_types.is_empty() {
            return true;
        }
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }

    /// Download the raw document behind `url`.
    ///
    /// The URL is validated before the context is consulted, so a bad URL is
    /// always reported as such. Everything after that is bounded by `ctx`.
    pub async fn download(&self, ctx: &FetchContext, url: &str) -> Result<FetchOutput, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|err| {
            FetchError::with_source(FailureKind::InvalidUrl, format!("cannot parse {url:?}"), err)
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::new(
                FailureKind::InvalidUrl,
                format!("unsupported scheme {:?}", parsed.scheme()),
            ));
        }
        let redirect_counter = Arc::new(AtomicUsize::new(0));
        let client = self.build_client(redirect_counter.clone())?;

        ctx.run(self.download_with(client, parsed, redirect_counter))
            .await
    }

    async fn download_with(
        &self,
        client: reqwest::Client,
        url: reqwest::Url,
        redirect_counter: Arc<AtomicUsize>,
    ) -> Result<FetchOutput, FetchError> {
        let original_url = url.to_string();
        gator_debug!("GET {}", original_url);
        let response = client.get(url).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        if let Some(ct) = content_type.as_deref() {
            if !self.is_content_type_allowed(ct) {
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: ct.to_string(),
                    },
                    "unsupported content type",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        let metadata = FetchMetadata {
            original_url,
            final_url,
            redirect_count: redirect_counter.load(Ordering::Relaxed),
            content_type,
            byte_len: bytes.len() as u64,
        };

        Ok(FetchOutput { bytes, metadata })
    }
}

#[async_trait::async_trait]
impl FeedSource for ReqwestFetcher {
    async fn fetch_feed(&self, ctx: &FetchContext, url: &str) -> Result<Feed, FetchError> {
        let output = self.download(ctx, url).await?;
        let decoded = decode_text(&output.bytes, output.metadata.content_type.as_deref())?;
        let feed = parse_feed(&decoded.text)?;
        gator_info!(
            "fetched {} ({} bytes, {}, {} redirect(s)): {} item(s)",
            output.metadata.final_url,
            output.metadata.byte_len,
            decoded.encoding_label,
            output.metadata.redirect_count,
            feed.items.len()
        );
        Ok(feed.sanitized())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::with_source(FailureKind::Timeout, "request timed out", err);
    }
    if err.is_redirect() {
        return FetchError::with_source(FailureKind::RedirectLimitExceeded, "too many redirects", err);
    }
    FetchError::with_source(FailureKind::Network, "request failed", err)
}
