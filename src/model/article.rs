use serde::{Deserialize, Serialize};

/// Publisher of an article as reported by the remote source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// A news article keyed by its origin URL.
///
/// `url` is the stable identifier: the cache never holds two articles with
/// the same URL and never holds one with an empty URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    #[serde(default)]
    pub source: Option<Source>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl Article {
    /// Create an article with only its identifier set.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source: None,
            author: None,
            title: None,
            description: None,
            url_to_image: None,
            published_at: None,
            content: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_source(mut self, id: Option<&str>, name: Option<&str>) -> Self {
        self.source = Some(Source {
            id: id.map(str::to_string),
            name: name.map(str::to_string),
        });
        self
    }

    /// Whether this article may be persisted.
    pub fn has_identifier(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Display name of the publisher, if the origin supplied one.
    pub fn source_name(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.name.as_deref())
    }
}
