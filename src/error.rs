//! Error taxonomy surfaced by the `perplexity_search` tool.

use crate::logging::redact_secrets;
use crate::search::SearchError;
use std::time::Duration;

/// Errors returned by the tool entry point
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchToolError {
    /// Caller supplied bad input; never retried
    #[error("invalid input: {0}")]
    Validation(String),

    /// Required configuration (the API key) is missing; never retried
    #[error("configuration error: {0}")]
    Config(String),

    /// The provider call failed, timed out, or was rate limited
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl SearchToolError {
    pub fn validation(message: impl Into<String>) -> Self {
        SearchToolError::Validation(message.into())
    }

    /// Short machine-readable kind used in log records
    pub fn kind(&self) -> &'static str {
        match self {
            SearchToolError::Validation(_) => "validation",
            SearchToolError::Config(_) => "config",
            SearchToolError::Provider(e) => e.kind.as_str(),
        }
    }

    /// Provider status string, when the failure came from the provider
    pub fn provider_status(&self) -> Option<&str> {
        match self {
            SearchToolError::Provider(e) => e.provider_status.as_deref(),
            _ => None,
        }
    }
}

/// Coarse classification of provider failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The provider refused the request as malformed
    Rejected,
    /// The API key was refused
    Unauthorized,
    /// The provider asked us to slow down
    RateLimited,
    /// Connection-level failure that survived the retry, or a provider-side fault
    Unavailable,
    /// The overall budget elapsed
    Timeout,
    /// The provider answered with something we could not decode
    Malformed,
}

impl ProviderErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderErrorKind::Rejected => "rejected",
            ProviderErrorKind::Unauthorized => "unauthorized",
            ProviderErrorKind::RateLimited => "rate_limited",
            ProviderErrorKind::Unavailable => "unavailable",
            ProviderErrorKind::Timeout => "timeout",
            ProviderErrorKind::Malformed => "malformed",
        }
    }
}

/// Terminal provider failure, after any retry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("perplexity_search failed: {message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,

    /// Concise, redacted description
    pub message: String,

    /// Provider-side status such as `rate_limited`, when known
    pub provider_status: Option<String>,

    /// How long the provider asked us to wait, when it said so
    pub retry_after: Option<Duration>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl AsRef<str>) -> Self {
        Self {
            kind,
            message: redact_secrets(message.as_ref()),
            provider_status: None,
            retry_after: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.provider_status = Some(status.into());
        self
    }

    pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
        self.retry_after = retry_after;
        self
    }

    /// The overall budget ran out before the provider answered.
    pub fn timeout(budget: Duration) -> Self {
        ProviderError::new(
            ProviderErrorKind::Timeout,
            format!("search timed out after {}ms", budget.as_millis()),
        )
        .with_status("timeout")
    }

    /// Map a provider-library error onto the tool's coarse taxonomy.
    pub fn from_search_error(err: &SearchError, retry_attempts: u32) -> Self {
        let retried = if retry_attempts > 0 { " after retry" } else { "" };
        match err {
            SearchError::Transport(_) => ProviderError::new(
                ProviderErrorKind::Unavailable,
                format!("provider unreachable{retried}: {err}"),
            )
            .with_status("unavailable"),
            SearchError::InvalidApiKey => {
                ProviderError::new(ProviderErrorKind::Unauthorized, err.to_string())
                    .with_status("auth_error")
            }
            SearchError::RateLimitExceeded { retry_after } => {
                ProviderError::new(ProviderErrorKind::RateLimited, err.to_string())
                    .with_status("rate_limited")
                    .with_retry_after(*retry_after)
            }
            SearchError::Rejected(_) => {
                ProviderError::new(ProviderErrorKind::Rejected, err.to_string())
                    .with_status("invalid_request")
            }
            SearchError::ApiError { .. } => {
                ProviderError::new(ProviderErrorKind::Unavailable, err.to_string())
                    .with_status("provider_error")
            }
            SearchError::InvalidResponse(_) => {
                ProviderError::new(ProviderErrorKind::Malformed, err.to_string())
                    .with_status("invalid_response")
            }
        }
    }
}
