use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use crate::config::RemoteConfig;
use crate::model::NewsResponse;
use crate::remote::{FetchParams, RemoteError, RemoteSource};

const API_KEY_HEADER: &str = "X-Api-Key";

/// NewsAPI-compatible HTTP source.
pub struct HttpNewsSource {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl HttpNewsSource {
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds.into()))
            .build()
            .map_err(|e| RemoteError::Unknown(format!("Failed to build HTTP client: {}", e)))?;

        let endpoint = format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.endpoint.trim_start_matches('/')
        );
        let endpoint = Url::parse(&endpoint).map_err(|e| {
            RemoteError::Unknown(format!("Invalid endpoint '{}': {}", endpoint, e))
        })?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.resolve_api_key(),
        })
    }

    fn request_url(&self, params: &FetchParams) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("country", &params.country);
            if let Some(page_size) = params.page_size {
                query.append_pair("pageSize", &page_size.to_string());
            }
        }
        url
    }
}

#[async_trait]
impl RemoteSource for HttpNewsSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_top_items(&self, params: &FetchParams) -> Result<NewsResponse, RemoteError> {
        let url = self.request_url(params);
        tracing::debug!(url = %url, "fetching top headlines");

        let mut builder = self.client.get(url);
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }

        let response = builder.send().await.map_err(|e| RemoteError::Transport {
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(server_error(status, &body));
        }

        response.json::<NewsResponse>().await.map_err(|e| {
            if e.is_decode() {
                RemoteError::Decode {
                    message: e.to_string(),
                }
            } else {
                RemoteError::Transport {
                    message: e.to_string(),
                }
            }
        })
    }
}

/// Build a server error, preferring the message from an error payload.
fn server_error(status: StatusCode, body: &str) -> RemoteError {
    let message = serde_json::from_str::<NewsResponse>(body)
        .ok()
        .and_then(|payload| payload.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
        });
    RemoteError::Server {
        status: status.as_u16(),
        message,
    }
}
