use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::cache::{CacheStore, CacheSubscription};
use crate::cancel::CancelToken;
use crate::model::{mapper, Article};
use crate::remote::{FetchParams, RemoteError, RemoteSource};
use crate::sync::outcome::{FetchOutcome, CONNECTIVITY_MESSAGE, UNEXPECTED_MESSAGE};

/// Predicate deciding whether a cycle should hit the remote source, given
/// the cached snapshot.
pub type ShouldFetch = Arc<dyn Fn(&[Article]) -> bool + Send + Sync>;

/// How a cycle decides whether to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Ask the synchronizer's `should_fetch` predicate.
    Auto,
    /// Always fetch (explicit refresh).
    Force,
    /// Never fetch; serve and follow the cache.
    CacheOnly,
}

/// Coordinates the cache and the remote source.
///
/// Cycles opened from one synchronizer share a write gate, so two cycles
/// never write to the cache at the same time even when their fetches
/// overlap.
pub struct ResourceSynchronizer {
    cache: Arc<dyn CacheStore>,
    remote: Arc<dyn RemoteSource>,
    params: FetchParams,
    should_fetch: ShouldFetch,
    write_gate: Arc<Mutex<()>>,
}

impl ResourceSynchronizer {
    pub fn new(cache: Arc<dyn CacheStore>, remote: Arc<dyn RemoteSource>) -> Self {
        Self {
            cache,
            remote,
            params: FetchParams::default(),
            should_fetch: Arc::new(|_: &[Article]| true),
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_params(mut self, params: FetchParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_should_fetch(mut self, should_fetch: ShouldFetch) -> Self {
        self.should_fetch = should_fetch;
        self
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    /// Open a new cycle. Must be called from within a tokio runtime.
    pub fn sync(&self, policy: FetchPolicy) -> SyncStream {
        let cancel = CancelToken::new();
        let (tx, rx) = mpsc::unbounded_channel();

        let cycle = Cycle {
            cache: Arc::clone(&self.cache),
            remote: Arc::clone(&self.remote),
            params: self.params.clone(),
            should_fetch: Arc::clone(&self.should_fetch),
            write_gate: Arc::clone(&self.write_gate),
            policy,
            tx,
            cancel: cancel.clone(),
        };
        tokio::spawn(cycle.run());

        SyncStream { rx, cancel }
    }
}

/// Ordered outcomes of one cycle.
///
/// Dropping the stream cancels the cycle and releases its cache
/// subscription.
pub struct SyncStream {
    rx: mpsc::UnboundedReceiver<FetchOutcome>,
    cancel: CancelToken,
}

impl SyncStream {
    /// Next outcome, or `None` once the cycle has ended or been cancelled.
    /// Outcomes buffered before a cancel are not delivered.
    pub async fn next(&mut self) -> Option<FetchOutcome> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            outcome = self.rx.recv() => outcome,
        }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for SyncStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// User-facing message for a remote failure.
pub fn failure_message(error: &RemoteError) -> String {
    match error {
        RemoteError::Transport { .. } => CONNECTIVITY_MESSAGE.to_string(),
        RemoteError::Server { message, .. } if !message.trim().is_empty() => message.clone(),
        RemoteError::Server { .. } | RemoteError::Decode { .. } | RemoteError::Unknown(_) => {
            UNEXPECTED_MESSAGE.to_string()
        }
    }
}

struct Cycle {
    cache: Arc<dyn CacheStore>,
    remote: Arc<dyn RemoteSource>,
    params: FetchParams,
    should_fetch: ShouldFetch,
    write_gate: Arc<Mutex<()>>,
    policy: FetchPolicy,
    tx: mpsc::UnboundedSender<FetchOutcome>,
    cancel: CancelToken,
}

impl Cycle {
    async fn run(self) {
        let mut live = self.cache.observe_all();
        let snapshot = live.current();

        let fetch = match self.policy {
            FetchPolicy::Force => true,
            FetchPolicy::CacheOnly => false,
            FetchPolicy::Auto => (self.should_fetch)(snapshot.as_slice()),
        };

        if fetch {
            tracing::info!(source = self.remote.name(), cached = snapshot.len(), "sync cycle fetching");
            if !self.emit(FetchOutcome::Loading(snapshot)) {
                return;
            }

            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::debug!("sync cycle cancelled during fetch");
                    return;
                }
                _ = self.tx.closed() => return,
                result = self.fetch_and_store() => result,
            };

            let outcome = match result {
                Ok(written) => {
                    tracing::info!(written, "sync cycle stored fresh articles");
                    FetchOutcome::Success(live.current())
                }
                Err(message) => FetchOutcome::Failed {
                    data: live.current(),
                    message,
                },
            };
            if !self.emit(outcome) {
                return;
            }
        } else {
            tracing::debug!(cached = snapshot.len(), "sync cycle serving cache");
            if !self.emit(FetchOutcome::Success(snapshot)) {
                return;
            }
        }

        self.follow(live).await;
    }

    /// Fetch, validate and write. On error returns the message to show.
    async fn fetch_and_store(&self) -> Result<usize, String> {
        let response = self
            .remote
            .fetch_top_items(&self.params)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "remote fetch failed");
                failure_message(&err)
            })?;

        if !response.is_ok() {
            let err = RemoteError::Server {
                status: 200,
                message: response.message.clone().unwrap_or_default(),
            };
            tracing::warn!(
                error = %err,
                status = response.status.as_deref().unwrap_or("<missing>"),
                "remote rejected request"
            );
            return Err(failure_message(&err));
        }

        let articles = mapper::articles_from_response(response);

        let gate = Arc::clone(&self.write_gate).lock_owned().await;
        if self.cancel.is_cancelled() {
            return Err(UNEXPECTED_MESSAGE.to_string());
        }
        // The guard moves into the write so it outlives a cancelled cycle.
        let cache = Arc::clone(&self.cache);
        let write = tokio::task::spawn_blocking(move || {
            let _gate = gate;
            cache.replace_all(articles)
        });
        match write.await {
            Ok(Ok(written)) => Ok(written),
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "failed to write fetched articles");
                Err(UNEXPECTED_MESSAGE.to_string())
            }
            Err(err) => {
                tracing::warn!(error = %err, "cache write task failed");
                Err(UNEXPECTED_MESSAGE.to_string())
            }
        }
    }

    async fn follow(&self, mut live: CacheSubscription) {
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = self.tx.closed() => break,
                changed = live.changed() => match changed {
                    Some(articles) => {
                        if !self.emit(FetchOutcome::Success(articles)) {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
        tracing::debug!("sync cycle ended");
    }

    fn emit(&self, outcome: FetchOutcome) -> bool {
        !self.cancel.is_cancelled() && self.tx.send(outcome).is_ok()
    }
}
