//! Common test utilities and fakes for the search tool
#![allow(dead_code)]

use perplexity_search_mcp::config::{LogFormat, LogSettings};
use perplexity_search_mcp::logging;
use perplexity_search_mcp::search::{
    ApiKey, ProviderItem, ProviderResults, SearchError, SearchOptions, SearchProvider,
};
use perplexity_search_mcp::tool::client::{ClientFactory, Connector, CredentialSource};
use perplexity_search_mcp::tool::invoker::SearchInvoker;
use perplexity_search_mcp::tool::PerplexitySearchTool;
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

/// Credential used by tests that expect a configured key
pub const TEST_API_KEY: &str = "pplx-test-0123456789abcdef";

/// One scripted provider answer
pub struct Step {
    delay: Duration,
    id: Option<String>,
    outcome: Result<Vec<ProviderItem>, SearchError>,
}

impl Step {
    pub fn ok(items: Vec<ProviderItem>) -> Self {
        Self {
            delay: Duration::ZERO,
            id: None,
            outcome: Ok(items),
        }
    }

    pub fn fail(err: SearchError) -> Self {
        Self {
            delay: Duration::ZERO,
            id: None,
            outcome: Err(err),
        }
    }

    /// Connection-level failure, eligible for the single retry
    pub fn transient() -> Self {
        Self::fail(SearchError::Transport("connection reset by peer".into()))
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Provider-side request id returned with a successful answer
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }
}

/// Scripted provider: answers with the queued steps in order, then empty results
#[derive(Default)]
pub struct FakeProvider {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(String, SearchOptions)>>,
}

impl FakeProvider {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            ..Default::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(String, SearchOptions)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SearchProvider for FakeProvider {
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<ProviderResults, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((query.to_string(), options.clone()));

        let step = self.steps.lock().unwrap().pop_front();
        let Some(step) = step else {
            return Ok(ProviderResults::default());
        };

        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }

        let id = step.id;
        step.outcome.map(|items| ProviderResults { items, id })
    }
}

/// Fixed credential; `None` simulates an unset variable
pub struct StaticCredentials(pub Option<String>);

impl CredentialSource for StaticCredentials {
    fn name(&self) -> &str {
        "PERPLEXITY_API_KEY"
    }

    fn read(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Hands out the same fake provider and counts client constructions
pub struct FakeConnector {
    provider: Arc<FakeProvider>,
    connects: AtomicUsize,
    keys: Mutex<Vec<String>>,
}

impl FakeConnector {
    pub fn new(provider: Arc<FakeProvider>) -> Arc<Self> {
        Arc::new(Self {
            provider,
            connects: AtomicUsize::new(0),
            keys: Mutex::new(Vec::new()),
        })
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }
}

impl Connector for FakeConnector {
    fn connect(&self, api_key: ApiKey) -> Arc<dyn SearchProvider> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.keys.lock().unwrap().push(api_key.expose().to_string());
        self.provider.clone()
    }
}

/// Client factory over the fake provider
pub fn fake_factory(provider: &Arc<FakeProvider>, key: Option<&str>) -> (ClientFactory, Arc<FakeConnector>) {
    let connector = FakeConnector::new(provider.clone());
    let factory = ClientFactory::new(
        Arc::new(StaticCredentials(key.map(str::to_string))),
        connector.clone(),
    );
    (factory, connector)
}

/// Search tool over the fake provider with the given budget
pub fn fake_tool(
    provider: &Arc<FakeProvider>,
    key: Option<&str>,
    budget: Duration,
) -> (PerplexitySearchTool, Arc<FakeConnector>) {
    let (factory, connector) = fake_factory(provider, key);
    (PerplexitySearchTool::new(factory, SearchInvoker::new(budget)), connector)
}

/// Provider record builder
pub fn item(title: &str, url: &str, date: Option<&str>) -> ProviderItem {
    ProviderItem {
        title: Some(title.to_string()),
        url: Some(url.to_string()),
        snippet: Some(format!("{title} snippet")),
        date: date.map(str::to_string),
        last_updated: None,
    }
}

/// In-memory log sink for asserting on emitted records
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Route this thread's events into the buffer as JSON lines.
    pub fn install(&self, level: &str) -> tracing::subscriber::DefaultGuard {
        let settings = LogSettings {
            format: LogFormat::Json,
            level: level.to_string(),
            file: None,
        };
        tracing::subscriber::set_default(logging::build_subscriber(&settings, self.clone(), false))
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Parsed JSON records, in emission order
    pub fn records(&self) -> Vec<serde_json::Value> {
        self.contents()
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).expect("log line should be JSON"))
            .collect()
    }

    /// Records whose message is `message`
    pub fn with_message(&self, message: &str) -> Vec<serde_json::Value> {
        self.records()
            .into_iter()
            .filter(|r| r["message"] == message)
            .collect()
    }

    /// Completion records (one per invocation)
    pub fn completions(&self) -> Vec<serde_json::Value> {
        self.records()
            .into_iter()
            .filter(|r| {
                r["target"] == "perplexity_search"
                    && r["message"]
                        .as_str()
                        .is_some_and(|m| m != "perplexity_search.start")
            })
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
