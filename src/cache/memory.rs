use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::cache::table::ArticleTable;
use crate::cache::{CacheError, CacheStore, CacheSubscription};
use crate::model::Article;

/// Process-local cache. Nothing survives a restart.
pub struct MemoryCache {
    table: RwLock<ArticleTable>,
    live: watch::Sender<Arc<Vec<Article>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        let (live, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            table: RwLock::new(ArticleTable::default()),
            live,
        }
    }

    /// Create a cache pre-populated with one batch.
    pub fn with_articles(articles: Vec<Article>) -> Self {
        let cache = Self::new();
        {
            let mut table = cache.table.write();
            table.upsert(articles);
            cache.live.send_replace(Arc::new(table.ordered()));
        }
        cache
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryCache {
    fn observe_all(&self) -> CacheSubscription {
        CacheSubscription::new(self.live.subscribe())
    }

    fn get_by_identifier(&self, url: &str) -> Result<Option<Article>, CacheError> {
        Ok(self.table.read().get(url))
    }

    fn replace_all(&self, articles: Vec<Article>) -> Result<usize, CacheError> {
        let mut table = self.table.write();
        let written = table.upsert(articles);
        if written == 0 {
            return Ok(0);
        }
        self.live.send_replace(Arc::new(table.ordered()));
        tracing::debug!(written, total = table.len(), "memory cache updated");
        Ok(written)
    }

    fn clear(&self) -> Result<(), CacheError> {
        let mut table = self.table.write();
        table.clear();
        self.live.send_replace(Arc::new(Vec::new()));
        Ok(())
    }

    fn count(&self) -> Result<usize, CacheError> {
        Ok(self.table.read().len())
    }
}
