use crate::logging::redact_value;
use crate::search::{ApiKey, ProviderItem, ProviderResults, SearchError, SearchOptions, SearchProvider};
use reqwest::header::RETRY_AFTER;
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest provider error body we keep in an error message
const MAX_ERROR_BODY: usize = 200;

/// Perplexity Search API provider
///
/// Issues `POST {api_base}/search` authenticated with a bearer key.
/// Documentation: https://docs.perplexity.ai/
pub struct PerplexityProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: ApiKey,
}

#[derive(Debug, Serialize)]
struct SearchBody<'a> {
    query: &'a str,
    max_results: u32,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    search_domain_filter: &'a [String],
}

#[derive(Debug, Deserialize)]
struct SearchResponseBody {
    #[serde(default)]
    results: Option<Vec<ProviderItem>>,
    #[serde(default)]
    id: Option<String>,
}

impl PerplexityProvider {
    /// Create a provider over a shared HTTP client.
    pub fn new(client: reqwest::Client, api_base: impl Into<String>, api_key: ApiKey) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/search", self.api_base.trim_end_matches('/'))
    }

    fn redact(&self, text: &str) -> String {
        redact_value(text, self.api_key.expose())
    }

    fn transport_error(&self, err: &reqwest::Error) -> SearchError {
        let message = self.redact(&err.to_string());
        if err.is_connect() || err.is_timeout() || err.is_request() {
            SearchError::Transport(message)
        } else {
            SearchError::InvalidResponse(message)
        }
    }

    async fn error_from_status(&self, response: Response) -> SearchError {
        let status = response.status();
        let retry_after = parse_retry_after(&response);
        let body = response.text().await.unwrap_or_default();
        let body = truncate(&self.redact(body.trim()), MAX_ERROR_BODY);

        tracing::debug!(
            status = %status,
            error = %body,
            "perplexity search api error"
        );

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SearchError::InvalidApiKey,
            StatusCode::TOO_MANY_REQUESTS => SearchError::RateLimitExceeded { retry_after },
            s if s.is_client_error() => SearchError::Rejected(format!("HTTP {}: {}", s.as_u16(), body)),
            s => SearchError::ApiError {
                status: s.as_u16(),
                message: body,
            },
        }
    }
}

#[async_trait::async_trait]
impl SearchProvider for PerplexityProvider {
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<ProviderResults, SearchError> {
        tracing::debug!(
            query_length = query.chars().count(),
            max_results = options.max_results,
            domain_filter_count = options.domain_filter.len(),
            "performing perplexity search"
        );

        let body = SearchBody {
            query,
            max_results: options.max_results,
            search_domain_filter: &options.domain_filter,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose())
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        if !response.status().is_success() {
            return Err(self.error_from_status(response).await);
        }

        let parsed: SearchResponseBody = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(self.redact(&e.to_string())))?;

        let items = parsed.results.unwrap_or_default();

        tracing::debug!(result_count = items.len(), "perplexity search completed");

        Ok(ProviderResults {
            items,
            id: parsed.id,
        })
    }
}

fn parse_retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
