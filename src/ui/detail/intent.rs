//! Intents for the detail view.

use crate::cache::CacheError;
use crate::model::Article;
use crate::ui::mvi::Intent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailIntent {
    /// Look up an article by URL. `None` when the caller had no URL to pass.
    LoadItem(Option<String>),
    ClearError,
}

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    Found(Article),
    NotFound,
    /// The lookup itself failed, with the failure's message if it had one.
    Failed(Option<String>),
}

impl From<Result<Option<Article>, CacheError>> for LookupResult {
    fn from(result: Result<Option<Article>, CacheError>) -> Self {
        match result {
            Ok(Some(article)) => LookupResult::Found(article),
            Ok(None) => LookupResult::NotFound,
            Err(err) => LookupResult::Failed(Some(err.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailEvent {
    Intent(DetailIntent),
    Lookup(LookupResult),
}

impl Intent for DetailEvent {}

impl From<DetailIntent> for DetailEvent {
    fn from(intent: DetailIntent) -> Self {
        DetailEvent::Intent(intent)
    }
}

impl From<LookupResult> for DetailEvent {
    fn from(result: LookupResult) -> Self {
        DetailEvent::Lookup(result)
    }
}
