mod common;

use common::{
    article, articles, ok_response, transport_error, urls, ScriptedRemote, SlowWriteCache,
};
use newsfeed::cache::{CacheStore, MemoryCache};
use newsfeed::model::{Article, NewsResponse};
use newsfeed::remote::RemoteError;
use newsfeed::sync::{
    FetchOutcome, FetchPolicy, ResourceSynchronizer, SyncStream, CONNECTIVITY_MESSAGE,
    UNEXPECTED_MESSAGE,
};
use std::sync::Arc;
use std::time::Duration;

async fn next(stream: &mut SyncStream) -> FetchOutcome {
    tokio::time::timeout(Duration::from_secs(2), stream.next())
        .await
        .expect("outcome in time")
        .expect("stream open")
}

async fn expect_silence(stream: &mut SyncStream) {
    let waited = tokio::time::timeout(Duration::from_millis(100), stream.next()).await;
    assert!(waited.is_err(), "unexpected outcome {:?}", waited);
}

#[tokio::test]
async fn empty_cache_loads_then_succeeds_with_fetched_items() {
    let cache = Arc::new(MemoryCache::new());
    let remote = ScriptedRemote::new();
    remote.reply(ok_response(&["https://x.test/1"]));
    let sync = ResourceSynchronizer::new(cache.clone(), remote.clone());

    let mut stream = sync.sync(FetchPolicy::Auto);
    assert_eq!(next(&mut stream).await, FetchOutcome::Loading(vec![]));
    assert_eq!(
        next(&mut stream).await,
        FetchOutcome::Success(vec![article("https://x.test/1")])
    );
    assert_eq!(cache.count().unwrap(), 1);
    assert_eq!(remote.calls(), 1);
}

#[tokio::test]
async fn transport_failure_keeps_cached_items() {
    let cached = articles(&["https://x.test/1"]);
    let cache = Arc::new(MemoryCache::with_articles(cached.clone()));
    let remote = ScriptedRemote::new();
    remote.reply(transport_error());
    let sync = ResourceSynchronizer::new(cache.clone(), remote);

    let mut stream = sync.sync(FetchPolicy::Auto);
    assert_eq!(next(&mut stream).await, FetchOutcome::Loading(cached.clone()));
    assert_eq!(
        next(&mut stream).await,
        FetchOutcome::Failed {
            data: cached,
            message: CONNECTIVITY_MESSAGE.to_string(),
        }
    );
}

#[tokio::test]
async fn server_message_is_surfaced() {
    let cache = Arc::new(MemoryCache::new());
    let remote = ScriptedRemote::new();
    remote.reply(Err(RemoteError::Server {
        status: 429,
        message: "You have made too many requests recently.".to_string(),
    }));
    let sync = ResourceSynchronizer::new(cache, remote);

    let mut stream = sync.sync(FetchPolicy::Force);
    next(&mut stream).await;
    match next(&mut stream).await {
        FetchOutcome::Failed { data, message } => {
            assert!(data.is_empty());
            assert_eq!(message, "You have made too many requests recently.");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn error_status_in_ok_response_is_a_failure() {
    let cached = articles(&["https://x.test/1"]);
    let cache = Arc::new(MemoryCache::with_articles(cached.clone()));
    let remote = ScriptedRemote::new();
    remote.reply(Ok(NewsResponse {
        status: Some("error".to_string()),
        code: Some("apiKeyInvalid".to_string()),
        message: Some("Your API key is invalid.".to_string()),
        ..Default::default()
    }));
    let sync = ResourceSynchronizer::new(cache.clone(), remote);

    let mut stream = sync.sync(FetchPolicy::Force);
    next(&mut stream).await;
    assert_eq!(
        next(&mut stream).await,
        FetchOutcome::Failed {
            data: cached.clone(),
            message: "Your API key is invalid.".to_string(),
        }
    );
    assert_eq!(cache.snapshot(), cached);
}

#[tokio::test]
async fn decode_failure_uses_generic_message() {
    let cache = Arc::new(MemoryCache::new());
    let remote = ScriptedRemote::new();
    remote.reply(Err(RemoteError::Decode {
        message: "expected value at line 1".to_string(),
    }));
    let sync = ResourceSynchronizer::new(cache, remote);

    let mut stream = sync.sync(FetchPolicy::Force);
    next(&mut stream).await;
    match next(&mut stream).await {
        FetchOutcome::Failed { message, .. } => assert_eq!(message, UNEXPECTED_MESSAGE),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn cache_changes_after_failure_emit_success() {
    let cache = Arc::new(MemoryCache::new());
    let remote = ScriptedRemote::new();
    remote.reply(transport_error());
    let sync = ResourceSynchronizer::new(cache.clone(), remote);

    let mut stream = sync.sync(FetchPolicy::Auto);
    next(&mut stream).await;
    assert!(matches!(next(&mut stream).await, FetchOutcome::Failed { .. }));

    cache.replace_all(articles(&["https://x.test/2"])).unwrap();
    assert_eq!(
        next(&mut stream).await,
        FetchOutcome::Success(articles(&["https://x.test/2"]))
    );
}

#[tokio::test]
async fn refresh_lands_fresh_batch_ahead_of_older_items() {
    let cache = Arc::new(MemoryCache::with_articles(articles(&["https://x.test/old"])));
    let remote = ScriptedRemote::new();
    remote.reply(ok_response(&["https://x.test/a", "https://x.test/b"]));
    let sync = ResourceSynchronizer::new(cache, remote);

    let mut stream = sync.sync(FetchPolicy::Force);
    next(&mut stream).await;
    let outcome = next(&mut stream).await;
    assert_eq!(
        urls(outcome.data()),
        vec!["https://x.test/a", "https://x.test/b", "https://x.test/old"]
    );
}

#[tokio::test]
async fn predicate_can_skip_the_fetch() {
    let cached = articles(&["https://x.test/1"]);
    let cache = Arc::new(MemoryCache::with_articles(cached.clone()));
    let remote = ScriptedRemote::new();
    let sync = ResourceSynchronizer::new(cache, remote.clone())
        .with_should_fetch(Arc::new(|snapshot: &[Article]| snapshot.is_empty()));

    let mut stream = sync.sync(FetchPolicy::Auto);
    assert_eq!(next(&mut stream).await, FetchOutcome::Success(cached));
    expect_silence(&mut stream).await;
    assert_eq!(remote.calls(), 0);
}

#[tokio::test]
async fn force_ignores_the_predicate() {
    let cache = Arc::new(MemoryCache::with_articles(articles(&["https://x.test/1"])));
    let remote = ScriptedRemote::new();
    remote.reply(ok_response(&["https://x.test/2"]));
    let sync = ResourceSynchronizer::new(cache, remote.clone())
        .with_should_fetch(Arc::new(|_: &[Article]| false));

    let mut stream = sync.sync(FetchPolicy::Force);
    assert!(matches!(next(&mut stream).await, FetchOutcome::Loading(_)));
    assert!(matches!(next(&mut stream).await, FetchOutcome::Success(_)));
    assert_eq!(remote.calls(), 1);
}

#[tokio::test]
async fn cancel_during_fetch_abandons_the_result() {
    let cache = Arc::new(MemoryCache::new());
    let remote = ScriptedRemote::new();
    remote.reply_after(Duration::from_millis(150), ok_response(&["https://x.test/late"]));
    let sync = ResourceSynchronizer::new(cache.clone(), remote);

    let mut stream = sync.sync(FetchPolicy::Force);
    assert_eq!(next(&mut stream).await, FetchOutcome::Loading(vec![]));
    stream.cancel();
    assert!(stream.next().await.is_none());

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(cache.count().unwrap(), 0);
}

#[tokio::test]
async fn dropped_stream_stops_following() {
    let cache = Arc::new(MemoryCache::new());
    let remote = ScriptedRemote::new();
    let sync = ResourceSynchronizer::new(cache.clone(), remote);

    let mut first = sync.sync(FetchPolicy::CacheOnly);
    assert_eq!(next(&mut first).await, FetchOutcome::Success(vec![]));
    let token = first.cancel_token();
    drop(first);
    assert!(token.is_cancelled());

    let mut second = sync.sync(FetchPolicy::CacheOnly);
    assert_eq!(next(&mut second).await, FetchOutcome::Success(vec![]));
    cache.replace_all(articles(&["https://x.test/1"])).unwrap();
    assert_eq!(
        next(&mut second).await,
        FetchOutcome::Success(articles(&["https://x.test/1"]))
    );
}

#[tokio::test]
async fn at_most_one_fetch_per_subscription() {
    let cache = Arc::new(MemoryCache::new());
    let remote = ScriptedRemote::new();
    remote.reply(ok_response(&["https://x.test/1"]));
    let sync = ResourceSynchronizer::new(cache.clone(), remote.clone());

    let mut stream = sync.sync(FetchPolicy::Auto);
    next(&mut stream).await;
    next(&mut stream).await;
    cache.replace_all(articles(&["https://x.test/2"])).unwrap();
    next(&mut stream).await;
    assert_eq!(remote.calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelled_write_finishes_before_the_next_cycle_writes() {
    let cache = SlowWriteCache::new(vec![], Duration::from_millis(300));
    let remote = ScriptedRemote::new();
    remote.reply(ok_response(&["https://x.test/old"]));
    remote.reply(ok_response(&["https://x.test/new"]));
    let sync = ResourceSynchronizer::new(cache.clone(), remote);

    let mut first = sync.sync(FetchPolicy::Force);
    assert_eq!(next(&mut first).await, FetchOutcome::Loading(vec![]));
    tokio::time::timeout(Duration::from_secs(2), async {
        while cache.writes_started() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("first write started");
    drop(first);

    let mut second = sync.sync(FetchPolicy::Force);
    assert!(matches!(next(&mut second).await, FetchOutcome::Loading(_)));
    let settled = next(&mut second).await;
    assert_eq!(cache.writes_finished(), 2);
    assert_eq!(
        urls(settled.data()),
        vec!["https://x.test/new", "https://x.test/old"]
    );
    assert_eq!(
        urls(&cache.snapshot()),
        vec!["https://x.test/new", "https://x.test/old"]
    );
}
