use crate::config::settings::DEFAULT_TIMEOUT_MS;
use crate::error::ProviderError;
use crate::search::{ProviderResults, SearchError, SearchOptions};
use crate::tool::client::ClientHandle;
use crate::tool::types::{SearchRequest, SearchResponse, SearchResult};
use std::time::Duration;

/// Result of one invocation plus what the request log needs to know about it
#[derive(Debug)]
pub struct Invocation {
    pub outcome: Result<SearchResponse, ProviderError>,
    /// 0 or 1
    pub retry_attempts: u32,
    /// Request id reported by the provider on success
    pub provider_request_id: Option<String>,
}

/// Calls the provider under an overall time budget with at most one retry.
///
/// Attempt 1 -> success | transient failure -> attempt 2 -> success | failure.
/// Non-transient failures end the invocation immediately. The budget covers
/// both attempts together, never each attempt separately.
#[derive(Debug, Clone)]
pub struct SearchInvoker {
    budget: Duration,
}

impl Default for SearchInvoker {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }
}

impl SearchInvoker {
    pub fn new(budget: Duration) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub async fn invoke(&self, client: &ClientHandle, request: &SearchRequest) -> Invocation {
        let options = SearchOptions {
            max_results: request.num_results(),
            domain_filter: request.domain_filter().map(<[String]>::to_vec).unwrap_or_default(),
        };

        let mut retry_attempts = 0u32;
        let mut provider_request_id = None;
        let attempts = run_attempts(client, request.query(), &options, &mut retry_attempts);
        let timed = tokio::time::timeout(self.budget, attempts).await;

        let outcome = match timed {
            Ok(Ok(results)) => {
                provider_request_id = results.id.clone();
                Ok(normalize(results, request.num_results()))
            }
            Ok(Err(err)) => {
                let mut mapped = ProviderError::from_search_error(&err, retry_attempts);
                mapped.message = client.redact(&mapped.message);
                Err(mapped)
            }
            Err(_) => {
                tracing::debug!(
                    timeout_ms = self.budget.as_millis() as u64,
                    retry_attempts,
                    "search budget exhausted"
                );
                Err(ProviderError::timeout(self.budget))
            }
        };

        Invocation {
            outcome,
            retry_attempts,
            provider_request_id,
        }
    }
}

async fn run_attempts(
    client: &ClientHandle,
    query: &str,
    options: &SearchOptions,
    retry_attempts: &mut u32,
) -> Result<ProviderResults, SearchError> {
    let provider = client.provider();
    match provider.search(query, options).await {
        Err(err) if err.is_transient() => {
            let error = client.redact(&err.to_string());
            tracing::debug!(error = %error, "transient provider failure, retrying once");
            *retry_attempts = 1;
            provider.search(query, options).await
        }
        other => other,
    }
}

fn normalize(results: ProviderResults, num_results: u32) -> SearchResponse {
    SearchResponse {
        results: results
            .items
            .into_iter()
            .take(num_results as usize)
            .map(SearchResult::from)
            .collect(),
    }
}
