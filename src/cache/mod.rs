//! Durable, key-indexed article cache.
//!
//! The cache is the canonical source the UI observes. Every store keeps the
//! ordered article list in a `watch` channel so any number of live queries
//! can follow it; writes replace records by URL inside one critical section
//! and publish the new list before releasing it.
//!
//! # Implementations
//!
//! - [`MemoryCache`]: process-local, used by tests and `--offline` dry runs.
//! - [`JsonFileCache`]: JSON file with atomic temp-file + rename writes.

mod json;
mod memory;
mod table;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

use crate::model::Article;

pub use json::JsonFileCache;
pub use memory::MemoryCache;

/// Errors that can occur when reading or writing the cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to access cache file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode cache file '{path}': {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to lock cache file '{path}': {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Rejected article: {message}")]
    Validation { message: String },
}

/// Check that an article may be written to the cache.
pub fn validate(article: &Article) -> Result<(), CacheError> {
    if article.has_identifier() {
        Ok(())
    } else {
        Err(CacheError::Validation {
            message: format!(
                "article '{}' has an empty url",
                article.title.as_deref().unwrap_or("<untitled>")
            ),
        })
    }
}

/// Key-indexed article store consumed by the synchronizer and the detail
/// lookup.
pub trait CacheStore: Send + Sync {
    /// Open a live query over all articles, newest batch first.
    fn observe_all(&self) -> CacheSubscription;

    /// Current ordered article list.
    fn snapshot(&self) -> Vec<Article> {
        self.observe_all().current()
    }

    fn get_by_identifier(&self, url: &str) -> Result<Option<Article>, CacheError>;

    /// Upsert a batch keyed by URL. All valid records land together or not
    /// at all; records with an empty URL are dropped from the batch.
    ///
    /// Returns the number of records written.
    fn replace_all(&self, articles: Vec<Article>) -> Result<usize, CacheError>;

    fn clear(&self) -> Result<(), CacheError>;

    fn count(&self) -> Result<usize, CacheError>;
}

/// A live query over the cache.
///
/// Dropping the subscription releases it; the store does not track
/// subscribers.
pub struct CacheSubscription {
    rx: watch::Receiver<Arc<Vec<Article>>>,
}

impl CacheSubscription {
    pub(crate) fn new(rx: watch::Receiver<Arc<Vec<Article>>>) -> Self {
        Self { rx }
    }

    /// Read the latest list and mark it as seen.
    pub fn current(&mut self) -> Vec<Article> {
        self.rx.borrow_and_update().as_ref().clone()
    }

    /// Wait for the next write and return the list it produced.
    ///
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<Vec<Article>> {
        self.rx.changed().await.ok()?;
        Some(self.current())
    }
}
