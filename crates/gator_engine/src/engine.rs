use std::sync::Arc;

use futures_util::future::join_all;
use gator_logging::gator_debug;

use crate::fetch::{FeedSource, FetchSettings, ReqwestFetcher};
use crate::{FailureKind, Feed, FetchContext, FetchError};

/// Runs feed fetches from synchronous code on a private current-thread runtime.
pub struct FeedEngine {
    runtime: tokio::runtime::Runtime,
    source: Arc<dyn FeedSource>,
}

impl FeedEngine {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        Self::with_source(Arc::new(ReqwestFetcher::new(settings)))
    }

    pub fn with_source(source: Arc<dyn FeedSource>) -> Result<Self, FetchError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| {
                FetchError::with_source(FailureKind::Client, "could not start async runtime", err)
            })?;
        Ok(Self { runtime, source })
    }

    /// Fetch one feed, blocking the calling thread.
    ///
    /// Must not be called from within an async context.
    pub fn fetch_blocking(&self, ctx: &FetchContext, url: &str) -> Result<Feed, FetchError> {
        self.runtime.block_on(self.source.fetch_feed(ctx, url))
    }

    /// Fetch every URL concurrently. Results come back in input order and
    /// each one stands alone: a failed fetch never cancels its siblings.
    pub fn fetch_all_blocking(
        &self,
        ctx: &FetchContext,
        urls: &[String],
    ) -> Vec<(String, Result<Feed, FetchError>)> {
        gator_debug!("fetching {} feed(s)", urls.len());
        let fetches = urls.iter().map(|url| {
            let source = Arc::clone(&self.source);
            let ctx = ctx.child(None);
            async move {
                let result = source.fetch_feed(&ctx, url).await;
                (url.clone(), result)
            }
        });
        self.runtime.block_on(join_all(fetches))
    }
}
