use crate::config::Config;
use crate::error::SearchToolError;
use crate::tool::client::ClientFactory;
use crate::tool::invoker::SearchInvoker;
use crate::tool::request_log::{Outcome, RequestLogContext};
use crate::tool::types::{SearchArgs, SearchResponse};
use crate::tool::validate::validate;

/// Tool name advertised to MCP clients
pub const TOOL_NAME: &str = "perplexity_search";

/// A finished invocation together with its finalized log context
#[derive(Debug)]
pub struct ToolRun {
    pub result: Result<SearchResponse, SearchToolError>,
    pub log: RequestLogContext,
}

/// The `perplexity_search` tool.
///
/// validate -> begin log -> build client -> mask log with the key -> invoke ->
/// complete log. Every path, failures included, completes the log context
/// exactly once.
#[derive(Clone)]
pub struct PerplexitySearchTool {
    factory: ClientFactory,
    invoker: SearchInvoker,
}

impl PerplexitySearchTool {
    pub fn new(factory: ClientFactory, invoker: SearchInvoker) -> Self {
        Self { factory, invoker }
    }

    /// Production wiring: env credential, Perplexity connector, configured budget.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            ClientFactory::from_settings(&config.provider)?,
            SearchInvoker::new(config.provider.timeout),
        ))
    }

    pub fn factory(&self) -> &ClientFactory {
        &self.factory
    }

    pub fn invoker(&self) -> &SearchInvoker {
        &self.invoker
    }

    pub async fn search(&self, args: SearchArgs) -> Result<SearchResponse, SearchToolError> {
        self.run(args).await.result
    }

    pub async fn run(&self, args: SearchArgs) -> ToolRun {
        let timeout = self.invoker.budget();

        let request = match validate(&args) {
            Ok(request) => request,
            Err(err) => {
                let mut log = RequestLogContext::begin_unvalidated(&args, timeout);
                if let Ok(key) = self.factory.read_key() {
                    log.mask(&key);
                }
                let log = log.complete(Outcome::Failure(&err));
                return ToolRun {
                    result: Err(err),
                    log,
                };
            }
        };

        let mut log = RequestLogContext::begin(&request, timeout);

        let client = match self.factory.build_client() {
            Ok(client) => client,
            Err(err) => {
                let log = log.complete(Outcome::Failure(&err));
                return ToolRun {
                    result: Err(err),
                    log,
                };
            }
        };

        log.mask(client.api_key());
        log.log_start();

        let invocation = self.invoker.invoke(&client, &request).await;
        log.record_invocation(&invocation);

        let result = invocation.outcome.map_err(SearchToolError::from);
        let log = match &result {
            Ok(response) => log.complete(Outcome::Success {
                result_count: response.results.len(),
            }),
            Err(err) => log.complete(Outcome::Failure(err)),
        };

        ToolRun { result, log }
    }
}
