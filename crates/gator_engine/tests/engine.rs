use std::sync::Arc;
use std::time::Duration;

use gator_engine::{
    FailureKind, Feed, FeedEngine, FeedSource, FetchContext, FetchError, FetchSettings, Item,
};

/// Serves canned feeds keyed by URL; URLs containing "down" fail, URLs
/// containing "slow" wait before answering.
struct StubSource;

#[async_trait::async_trait]
impl FeedSource for StubSource {
    async fn fetch_feed(&self, ctx: &FetchContext, url: &str) -> Result<Feed, FetchError> {
        if url.contains("slow") {
            let wait = ctx.run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            });
            wait.await?;
        }
        if url.contains("down") {
            // Reuse the real fetcher's error path for an unreachable host.
            return gator_engine::ReqwestFetcher::new(FetchSettings::default())
                .fetch_feed(ctx, "http://127.0.0.1:1/")
                .await;
        }
        Ok(Feed {
            title: format!("feed at {url}"),
            items: vec![Item {
                title: "only".into(),
                ..Item::default()
            }],
            ..Feed::default()
        })
    }
}

fn engine() -> FeedEngine {
    FeedEngine::with_source(Arc::new(StubSource)).unwrap()
}

#[test]
fn fetch_blocking_returns_the_feed() {
    let feed = engine()
        .fetch_blocking(&FetchContext::background(), "https://a.example/rss")
        .unwrap();
    assert_eq!(feed.title, "feed at https://a.example/rss");
    assert_eq!(feed.items.len(), 1);
}

#[test]
fn one_failure_does_not_abort_siblings() {
    let urls = vec![
        "https://a.example/rss".to_string(),
        "https://down.example/rss".to_string(),
        "https://b.example/rss".to_string(),
    ];
    let results = engine().fetch_all_blocking(&FetchContext::background(), &urls);

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].0, urls[0]);
    assert!(results[0].1.is_ok());
    assert_eq!(
        results[1].1.as_ref().unwrap_err().kind,
        FailureKind::Network
    );
    assert_eq!(results[2].1.as_ref().unwrap().title, "feed at https://b.example/rss");
}

#[test]
fn shared_deadline_applies_to_every_fetch() {
    let urls = vec![
        "https://slow.example/rss".to_string(),
        "https://fast.example/rss".to_string(),
    ];
    let ctx = FetchContext::with_timeout(Duration::from_millis(50));
    let results = engine().fetch_all_blocking(&ctx, &urls);

    assert_eq!(
        results[0].1.as_ref().unwrap_err().kind,
        FailureKind::DeadlineExceeded
    );
    assert!(results[1].1.is_ok());
}

#[test]
fn child_contexts_follow_parent_cancellation() {
    let parent = FetchContext::background();
    let child = parent.child(Some(Duration::from_secs(60)));
    assert!(!child.is_cancelled());
    assert!(child.deadline().is_some());
    parent.cancel();
    assert!(child.is_cancelled());
    assert_eq!(child.check().unwrap_err().kind, FailureKind::Cancelled);
}
