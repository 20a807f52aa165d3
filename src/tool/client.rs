use crate::config::ProviderSettings;
use crate::error::SearchToolError;
use crate::logging::redact_value;
use crate::search::providers::PerplexityProvider;
use crate::search::{ApiKey, SearchProvider};
use std::sync::Arc;
use std::time::Duration;

/// Where the API key comes from
pub trait CredentialSource: Send + Sync {
    /// Name of the credential, for error messages (never the value)
    fn name(&self) -> &str;

    /// Current value, read fresh on every call
    fn read(&self) -> Option<String>;
}

/// Reads the API key from one environment variable at call time, so the key
/// can be rotated without restarting the server.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialSource for EnvCredentials {
    fn name(&self) -> &str {
        &self.var
    }

    fn read(&self) -> Option<String> {
        std::env::var(&self.var).ok()
    }
}

/// Turns an API key into an authenticated provider client
pub trait Connector: Send + Sync {
    fn connect(&self, api_key: ApiKey) -> Arc<dyn SearchProvider>;
}

/// Connects `PerplexityProvider`s over one shared HTTP connection pool
pub struct PerplexityConnector {
    http: reqwest::Client,
    api_base: String,
}

impl PerplexityConnector {
    pub fn new(settings: &ProviderSettings) -> Result<Self, reqwest::Error> {
        // The overall budget is enforced by the invoker; the connect timeout
        // only keeps a dead host from holding a socket past it.
        let connect_timeout = settings.timeout.min(Duration::from_secs(5));
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(concat!("perplexity-search-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_base: settings.api_base.clone(),
        })
    }
}

impl Connector for PerplexityConnector {
    fn connect(&self, api_key: ApiKey) -> Arc<dyn SearchProvider> {
        Arc::new(PerplexityProvider::new(
            self.http.clone(),
            self.api_base.clone(),
            api_key,
        ))
    }
}

/// Authenticated provider client, valid for one invocation
#[derive(Clone)]
pub struct ClientHandle {
    provider: Arc<dyn SearchProvider>,
    api_key: ApiKey,
}

impl ClientHandle {
    pub fn provider(&self) -> &dyn SearchProvider {
        self.provider.as_ref()
    }

    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Mask the key this client was built with, plus any key-shaped token.
    pub fn redact(&self, text: &str) -> String {
        redact_value(text, self.api_key.expose())
    }
}

/// Builds a client per invocation from the current credential. Fails closed.
#[derive(Clone)]
pub struct ClientFactory {
    credentials: Arc<dyn CredentialSource>,
    connector: Arc<dyn Connector>,
}

impl ClientFactory {
    pub fn new(credentials: Arc<dyn CredentialSource>, connector: Arc<dyn Connector>) -> Self {
        Self {
            credentials,
            connector,
        }
    }

    /// Perplexity client factory reading `settings.api_key_env`.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            Arc::new(EnvCredentials::new(settings.api_key_env.clone())),
            Arc::new(PerplexityConnector::new(settings)?),
        ))
    }

    pub fn credential_name(&self) -> &str {
        self.credentials.name()
    }

    /// Current credential, trimmed. Missing or blank values are a `Config` error.
    pub fn read_key(&self) -> Result<ApiKey, SearchToolError> {
        let raw = self.credentials.read().unwrap_or_default();
        let key = raw.trim();
        if key.is_empty() {
            return Err(SearchToolError::Config(format!(
                "missing credential: {} is required but missing or empty",
                self.credentials.name()
            )));
        }
        Ok(ApiKey::new(key))
    }

    pub fn build_client(&self) -> Result<ClientHandle, SearchToolError> {
        let api_key = self.read_key()?;
        Ok(ClientHandle {
            provider: self.connector.connect(api_key.clone()),
            api_key,
        })
    }
}
