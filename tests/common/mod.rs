//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use async_trait::async_trait;
use newsfeed::cache::{CacheError, CacheStore, CacheSubscription, MemoryCache};
use newsfeed::model::{Article, ArticleDto, NewsResponse, SourceDto};
use newsfeed::remote::{FetchParams, RemoteError, RemoteSource};
use newsfeed::ui::view_state::ViewStateSubscription;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const STEP_TIMEOUT: Duration = Duration::from_secs(2);

// -- Remote -------------------------------------------------------------------

struct Scripted {
    delay: Duration,
    reply: Result<NewsResponse, RemoteError>,
}

/// Remote source that plays back queued replies in order.
pub struct ScriptedRemote {
    replies: Mutex<VecDeque<Scripted>>,
    calls: AtomicUsize,
}

impl ScriptedRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn reply(&self, reply: Result<NewsResponse, RemoteError>) {
        self.reply_after(Duration::ZERO, reply);
    }

    pub fn reply_after(&self, delay: Duration, reply: Result<NewsResponse, RemoteError>) {
        self.replies.lock().push_back(Scripted { delay, reply });
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteSource for ScriptedRemote {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch_top_items(&self, _: &FetchParams) -> Result<NewsResponse, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.replies.lock().pop_front();
        match next {
            Some(Scripted { delay, reply }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                reply
            }
            None => Err(RemoteError::Unknown("no reply scripted".to_string())),
        }
    }
}

pub fn ok_response(urls: &[&str]) -> Result<NewsResponse, RemoteError> {
    Ok(NewsResponse {
        status: Some("ok".to_string()),
        total_results: Some(urls.len() as u32),
        articles: Some(urls.iter().map(|u| dto(u)).collect()),
        ..Default::default()
    })
}

pub fn transport_error() -> Result<NewsResponse, RemoteError> {
    Err(RemoteError::Transport {
        message: "connection refused".to_string(),
    })
}

pub fn dto(url: &str) -> ArticleDto {
    ArticleDto {
        source: Some(SourceDto {
            id: None,
            name: Some("Wire".to_string()),
        }),
        title: Some(format!("Title of {}", url)),
        url: Some(url.to_string()),
        ..Default::default()
    }
}

/// The article `dto(url)` maps to.
pub fn article(url: &str) -> Article {
    Article::new(url)
        .with_title(format!("Title of {}", url))
        .with_source(None, Some("Wire"))
}

pub fn articles(urls: &[&str]) -> Vec<Article> {
    urls.iter().map(|u| article(u)).collect()
}

pub fn urls(articles: &[Article]) -> Vec<&str> {
    articles.iter().map(|a| a.url.as_str()).collect()
}

// -- Cache --------------------------------------------------------------------

/// Memory cache that counts lookups and can be told to fail them.
pub struct CountingCache {
    inner: MemoryCache,
    lookups: AtomicUsize,
    fail_lookups: AtomicBool,
}

impl CountingCache {
    pub fn new(articles: Vec<Article>) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryCache::with_articles(articles),
            lookups: AtomicUsize::new(0),
            fail_lookups: AtomicBool::new(false),
        })
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn fail_lookups(&self) {
        self.fail_lookups.store(true, Ordering::SeqCst);
    }
}

impl CacheStore for CountingCache {
    fn observe_all(&self) -> CacheSubscription {
        self.inner.observe_all()
    }

    fn get_by_identifier(&self, url: &str) -> Result<Option<Article>, CacheError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(CacheError::Io {
                path: PathBuf::from("/dev/null/articles.json"),
                source: std::io::Error::other("disk unplugged"),
            });
        }
        self.inner.get_by_identifier(url)
    }

    fn replace_all(&self, articles: Vec<Article>) -> Result<usize, CacheError> {
        self.inner.replace_all(articles)
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.inner.clear()
    }

    fn count(&self) -> Result<usize, CacheError> {
        self.inner.count()
    }
}

/// Memory cache whose first write blocks for `delay`.
pub struct SlowWriteCache {
    inner: MemoryCache,
    delay: Duration,
    started: AtomicUsize,
    finished: AtomicUsize,
}

impl SlowWriteCache {
    pub fn new(articles: Vec<Article>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryCache::with_articles(articles),
            delay,
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        })
    }

    pub fn writes_started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn writes_finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

impl CacheStore for SlowWriteCache {
    fn observe_all(&self) -> CacheSubscription {
        self.inner.observe_all()
    }

    fn get_by_identifier(&self, url: &str) -> Result<Option<Article>, CacheError> {
        self.inner.get_by_identifier(url)
    }

    fn replace_all(&self, articles: Vec<Article>) -> Result<usize, CacheError> {
        if self.started.fetch_add(1, Ordering::SeqCst) == 0 {
            std::thread::sleep(self.delay);
        }
        let written = self.inner.replace_all(articles);
        self.finished.fetch_add(1, Ordering::SeqCst);
        written
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.inner.clear()
    }

    fn count(&self) -> Result<usize, CacheError> {
        self.inner.count()
    }
}

/// Temp dir plus the cache file path inside it.
pub fn temp_cache_path() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("cache").join("articles.json");
    (temp_dir, path)
}

// -- View states --------------------------------------------------------------

/// Next published state, failing the test if none arrives in time.
pub async fn next_state<S>(sub: &mut ViewStateSubscription<S>) -> S {
    tokio::time::timeout(STEP_TIMEOUT, sub.next())
        .await
        .expect("state in time")
        .expect("stream open")
}

/// Read states until one matches, returning everything read.
pub async fn states_until<S, F>(sub: &mut ViewStateSubscription<S>, mut done: F) -> Vec<S>
where
    S: Clone,
    F: FnMut(&S) -> bool,
{
    let mut seen = Vec::new();
    loop {
        let state = next_state(sub).await;
        let stop = done(&state);
        seen.push(state);
        if stop {
            return seen;
        }
    }
}

/// Assert nothing further is published for a short while.
pub async fn assert_quiet<S: std::fmt::Debug>(sub: &mut ViewStateSubscription<S>) {
    tokio::time::sleep(Duration::from_millis(100)).await;
    if let Some(state) = sub.try_next() {
        panic!("unexpected state {:?}", state);
    }
}
