use crate::config::{Config, LogFormat};
use crate::tool::PerplexitySearchTool;
use crate::{logging, server};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// MCP server exposing Perplexity web search as a single tool.
///
/// The API key is read from PERPLEXITY_API_KEY on every search. Flags
/// override the matching environment variables.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log rendering mode [env: LOG_FORMAT]
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Log verbosity or filter directive [env: LOG_LEVEL]
    #[arg(long)]
    pub log_level: Option<String>,

    /// Write logs to this file instead of stderr [env: LOG_FILE]
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Perplexity API base URL [env: PERPLEXITY_API_BASE]
    #[arg(long)]
    pub api_base: Option<String>,

    /// Overall search budget in milliseconds, retry included [env: PERPLEXITY_TIMEOUT_MS]
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl Cli {
    /// Layer the flags over an environment-derived config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(format) = self.log_format {
            config.log.format = format;
        }
        if let Some(level) = &self.log_level {
            config.set_log_level(level);
        }
        if let Some(file) = &self.log_file {
            config.log.file = Some(file.clone());
        }
        if let Some(base) = &self.api_base {
            config.provider.api_base = base.trim().to_string();
        }
        if let Some(ms) = self.timeout_ms {
            config.set_timeout_ms(&ms.to_string());
        }
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    cli.apply(&mut config);

    let _log_guard = logging::init(&config.log)?;
    for notice in &config.notices {
        tracing::warn!(notice = %notice, "ignoring invalid setting");
    }

    let tool = PerplexitySearchTool::from_config(&config).context("Failed to build HTTP client")?;

    tracing::info!(
        api_base = %config.provider.api_base,
        timeout_ms = config.provider.timeout.as_millis() as u64,
        credential = %tool.factory().credential_name(),
        credential_present = std::env::var(&config.provider.api_key_env)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false),
        "perplexity search MCP server starting"
    );

    server::serve_stdio(tool).await
}
