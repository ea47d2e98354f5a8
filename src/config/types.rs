use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Remote headline source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Scheme + host of the API (e.g., "https://newsapi.org").
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the top-headlines endpoint, relative to `base_url`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// ISO 3166 country code passed with every fetch.
    #[serde(default = "default_country")]
    pub country: String,
    /// Number of articles to request (server default when unset).
    #[serde(default)]
    pub page_size: Option<u32>,
    /// Direct API key. Takes precedence over `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is unset.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
}

/// Local cache settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache file location. Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Synchronization policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Fetch from the remote source on every load. When false, a load only
    /// fetches if the cache is empty; refresh always fetches.
    #[serde(default = "default_fetch_on_subscribe")]
    pub fetch_on_subscribe: bool,
}

fn default_base_url() -> String {
    "https://newsapi.org".to_string()
}

fn default_endpoint() -> String {
    "v2/top-headlines".to_string()
}

fn default_country() -> String {
    "us".to_string()
}

fn default_api_key_env() -> String {
    "NEWS_API_KEY".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_fetch_on_subscribe() -> bool {
    true
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoint: default_endpoint(),
            country: default_country(),
            page_size: None,
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_on_subscribe: default_fetch_on_subscribe(),
        }
    }
}

impl RemoteConfig {
    /// API key from config, falling back to the configured env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty()))
    }
}

impl CacheConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
            data_dir.join("newsfeed").join("articles.json")
        })
    }
}
