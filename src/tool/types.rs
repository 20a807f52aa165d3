use crate::search::ProviderItem;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Raw arguments of the `perplexity_search` tool, as sent by the MCP client
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SearchArgs {
    /// Search query. Must be non-empty after trimming, at most 4096 characters.
    pub query: String,

    /// Number of results to return (default 10, clamped to 1..=30).
    #[serde(default)]
    #[schemars(with = "Option<i64>")]
    pub num_results: Option<serde_json::Value>,

    /// Only return results from these hostnames (e.g. ["docs.rs", "github.com"]).
    #[serde(default)]
    pub search_domain_filter: Option<Vec<String>>,
}

impl SearchArgs {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_num_results(mut self, num_results: impl Into<serde_json::Value>) -> Self {
        self.num_results = Some(num_results.into());
        self
    }

    pub fn with_domain_filter<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_domain_filter = Some(domains.into_iter().map(Into::into).collect());
        self
    }
}

/// A request that passed validation.
///
/// `num_results` is always within 1..=30 and the domain filter, when present,
/// is non-empty, de-duplicated and made of well-formed hostnames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub(crate) query: String,
    pub(crate) num_results: u32,
    pub(crate) domain_filter: Option<Vec<String>>,
}

impl SearchRequest {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn num_results(&self) -> u32 {
        self.num_results
    }

    pub fn domain_filter(&self) -> Option<&[String]> {
        self.domain_filter.as_deref()
    }
}

/// One normalized search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    /// Publication date, only when the provider supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub last_update: String,
    pub snippet: String,
}

impl From<ProviderItem> for SearchResult {
    fn from(item: ProviderItem) -> Self {
        let date = item.date.filter(|d| !d.is_empty());
        let last_update = item
            .last_updated
            .filter(|d| !d.is_empty())
            .or_else(|| date.clone())
            .unwrap_or_default();

        Self {
            title: item.title.unwrap_or_default(),
            url: item.url.unwrap_or_default(),
            date,
            last_update,
            snippet: item.snippet.unwrap_or_default(),
        }
    }
}

/// Tool output: `{"results": [...]}` in provider order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}
