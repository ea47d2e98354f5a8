//! Remote headline source.

mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::NewsResponse;

pub use http::HttpNewsSource;

/// Query parameters for a top-headlines fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchParams {
    pub country: String,
    pub page_size: Option<u32>,
}

impl Default for FetchParams {
    fn default() -> Self {
        Self {
            country: "us".to_string(),
            page_size: None,
        }
    }
}

/// Classified remote failures.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Connectivity, DNS, TLS or timeout failure; no response was received.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The server answered with a non-success status or an error payload.
    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    /// The response body could not be parsed.
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl RemoteError {
    pub fn is_transport(&self) -> bool {
        matches!(self, RemoteError::Transport { .. })
    }
}

/// A source of top headlines.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Returns the name of this source for logging.
    fn name(&self) -> &'static str;

    async fn fetch_top_items(&self, params: &FetchParams) -> Result<NewsResponse, RemoteError>;
}
