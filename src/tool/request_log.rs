use crate::error::SearchToolError;
use crate::logging::{redact_secrets, redact_user_text};
use crate::search::ApiKey;
use crate::tool::invoker::Invocation;
use crate::tool::types::{SearchArgs, SearchRequest};
use crate::tool::validate::{clamp_num_results, DEFAULT_RESULTS};
use std::time::{Duration, Instant};
use tracing::Level;
use uuid::Uuid;

/// Target of every per-request record
pub const LOG_TARGET: &str = "perplexity_search";

/// One structured record carrying every context field plus any extras.
macro_rules! emit_record {
    ($level:expr, $ctx:expr, $msg:literal $(, $($extra:tt)*)?) => {
        tracing::event!(
            target: LOG_TARGET,
            $level,
            request_id = %$ctx.request_id,
            query = %$ctx.query,
            domain_filter = %$ctx.domain_filter.join(","),
            query_length = $ctx.query_length,
            domain_filter_count = $ctx.domain_filter_count,
            num_results = $ctx.num_results,
            duration_ms = $ctx.duration_ms,
            result_count = $ctx.result_count,
            provider_status = $ctx.provider_status.as_deref(),
            provider_request_id = $ctx.provider_request_id.as_deref(),
            timeout_ms = $ctx.timeout_ms,
            retry_attempts = $ctx.retry_attempts,
            $($($extra)*)?
            $msg
        )
    };
}

/// How an invocation ended
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    Success { result_count: usize },
    Failure(&'a SearchToolError),
}

/// Per-request log context. Holds request data only; the credential never
/// reaches this type, and caller text is masked with it via [`Self::mask`]
/// before the first record goes out.
#[derive(Debug, Clone)]
pub struct RequestLogContext {
    pub request_id: String,
    pub query: String,
    pub domain_filter: Vec<String>,
    pub query_length: usize,
    pub domain_filter_count: usize,
    pub num_results: u32,
    pub timeout_ms: u64,
    pub duration_ms: u64,
    pub result_count: usize,
    pub provider_status: Option<String>,
    pub provider_request_id: Option<String>,
    pub retry_attempts: u32,
    started: Instant,
}

impl RequestLogContext {
    /// Start the clock for a validated request.
    pub fn begin(request: &SearchRequest, timeout: Duration) -> Self {
        let domain_filter = request.domain_filter().map(<[String]>::to_vec).unwrap_or_default();
        Self::start(request.query(), domain_filter, request.num_results(), timeout)
    }

    /// Start the clock from raw arguments that failed validation, so the
    /// rejection still gets its completion record.
    pub fn begin_unvalidated(args: &SearchArgs, timeout: Duration) -> Self {
        let num_results = clamp_num_results(args.num_results.as_ref()).unwrap_or(DEFAULT_RESULTS);
        let domain_filter = args.search_domain_filter.clone().unwrap_or_default();
        Self::start(&args.query, domain_filter, num_results, timeout)
    }

    fn start(query: &str, domain_filter: Vec<String>, num_results: u32, timeout: Duration) -> Self {
        Self {
            request_id: Uuid::new_v4().simple().to_string(),
            query: redact_user_text(query, None),
            query_length: query.chars().count(),
            domain_filter_count: domain_filter.len(),
            domain_filter: domain_filter
                .iter()
                .map(|d| redact_user_text(d, None))
                .collect(),
            num_results,
            timeout_ms: timeout.as_millis() as u64,
            duration_ms: 0,
            result_count: 0,
            provider_status: None,
            provider_request_id: None,
            retry_attempts: 0,
            started: Instant::now(),
        }
    }

    /// Mask the live credential wherever it shows up in caller-supplied fields.
    pub fn mask(&mut self, key: &ApiKey) {
        let secret = Some(key.expose());
        self.query = redact_user_text(&self.query, secret);
        for domain in &mut self.domain_filter {
            *domain = redact_user_text(domain, secret);
        }
    }

    /// Debug record marking the provider call about to start.
    pub fn log_start(&self) {
        tracing::debug!(
            target: LOG_TARGET,
            request_id = %self.request_id,
            query = %self.query,
            query_length = self.query_length,
            num_results = self.num_results,
            domain_filter_count = self.domain_filter_count,
            timeout_ms = self.timeout_ms,
            "perplexity_search.start"
        );
    }

    pub fn record_invocation(&mut self, invocation: &Invocation) {
        self.retry_attempts = invocation.retry_attempts;
        self.provider_request_id = invocation.provider_request_id.clone();
    }

    /// Finalize the context and emit exactly one completion record.
    pub fn complete(mut self, outcome: Outcome<'_>) -> Self {
        self.duration_ms = self.started.elapsed().as_millis() as u64;

        match outcome {
            Outcome::Success { result_count } => {
                self.result_count = result_count;
                self.provider_status = Some("ok".to_string());
                emit_record!(Level::INFO, self, "perplexity_search.success");
            }
            Outcome::Failure(err) => {
                self.result_count = 0;
                self.provider_status = err.provider_status().map(str::to_string);
                let error = redact_secrets(&err.to_string());
                match err {
                    SearchToolError::Validation(_) => emit_record!(
                        Level::WARN,
                        self,
                        "perplexity_search.invalid_input",
                        error_kind = err.kind(),
                        error = %error,
                    ),
                    SearchToolError::Config(_) => emit_record!(
                        Level::ERROR,
                        self,
                        "perplexity_search.config_error",
                        error_kind = err.kind(),
                        error = %error,
                    ),
                    SearchToolError::Provider(e) => emit_record!(
                        Level::ERROR,
                        self,
                        "perplexity_search.provider_error",
                        error_kind = err.kind(),
                        error = %error,
                        retry_after_ms = e.retry_after.map(|d| d.as_millis() as u64),
                    ),
                }
            }
        }

        self
    }
}
