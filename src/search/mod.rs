pub mod providers;

use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Search provider abstraction - the tool only talks to providers through this trait
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Perform a search query with given options
    async fn search(&self, query: &str, options: &SearchOptions)
        -> Result<ProviderResults, SearchError>;
}

/// Options forwarded to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum number of results to return
    pub max_results: u32,
    /// Only include results from these domains (empty = no filter, parameter omitted)
    pub domain_filter: Vec<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 10,
            domain_filter: Vec::new(),
        }
    }
}

/// Results as the provider returned them, in provider order
#[derive(Debug, Clone, Default)]
pub struct ProviderResults {
    pub items: Vec<ProviderItem>,
    /// Provider-side request id, if any
    pub id: Option<String>,
}

/// One raw provider record. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// API key handed to a provider client. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Search-related errors raised by provider clients
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    /// Connection-level failure: unreachable, reset, connect timeout
    #[error("connection error: {0}")]
    Transport(String),

    #[error("invalid API key")]
    InvalidApiKey,

    #[error("rate limit exceeded")]
    RateLimitExceeded { retry_after: Option<Duration> },

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl SearchError {
    /// Whether one retry is worth it. Only connection-level failures qualify.
    pub fn is_transient(&self) -> bool {
        matches!(self, SearchError::Transport(_))
    }
}
