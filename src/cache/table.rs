use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::cache::validate;
use crate::model::Article;

/// An article as held by a store.
///
/// `revision` is the write that last touched the record and `rank` its
/// position inside that write; together they give the recency order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoredArticle {
    #[serde(flatten)]
    pub article: Article,
    pub last_updated: u64,
    pub revision: u64,
    pub rank: usize,
}

/// Shared in-memory index used by every store implementation.
#[derive(Debug, Clone, Default)]
pub(crate) struct ArticleTable {
    revision: u64,
    entries: HashMap<String, StoredArticle>,
}

impl ArticleTable {
    pub fn from_entries(entries: Vec<StoredArticle>) -> Self {
        let revision = entries.iter().map(|e| e.revision).max().unwrap_or(0);
        let entries = entries
            .into_iter()
            .map(|e| (e.article.url.clone(), e))
            .collect();
        Self { revision, entries }
    }

    pub fn entries(&self) -> Vec<StoredArticle> {
        let mut entries: Vec<StoredArticle> = self.entries.values().cloned().collect();
        entries.sort_by(|a, b| b.revision.cmp(&a.revision).then(a.rank.cmp(&b.rank)));
        entries
    }

    pub fn ordered(&self) -> Vec<Article> {
        self.entries().into_iter().map(|e| e.article).collect()
    }

    pub fn get(&self, url: &str) -> Option<Article> {
        self.entries.get(url).map(|e| e.article.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Apply one batch as a single revision. A URL repeated inside the batch
    /// keeps its first position and its last record. An empty batch leaves
    /// the table untouched.
    ///
    /// Returns the number of records written.
    pub fn upsert(&mut self, articles: Vec<Article>) -> usize {
        let mut batch: Vec<Article> = Vec::with_capacity(articles.len());
        let mut positions: HashMap<String, usize> = HashMap::new();

        for article in articles {
            if let Err(err) = validate(&article) {
                tracing::debug!(error = %err, "dropping article from batch");
                continue;
            }
            match positions.get(&article.url) {
                Some(&pos) => batch[pos] = article,
                None => {
                    positions.insert(article.url.clone(), batch.len());
                    batch.push(article);
                }
            }
        }

        if batch.is_empty() {
            return 0;
        }

        self.revision += 1;
        let now = now_millis();
        let written = batch.len();
        for (rank, article) in batch.into_iter().enumerate() {
            let stored = StoredArticle {
                article,
                last_updated: now,
                revision: self.revision,
                rank,
            };
            self.entries.insert(stored.article.url.clone(), stored);
        }

        written
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
