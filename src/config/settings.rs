use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default Perplexity API base URL
pub const DEFAULT_API_BASE: &str = "https://api.perplexity.ai";

/// Environment variable holding the Perplexity API key
pub const DEFAULT_API_KEY_ENV: &str = "PERPLEXITY_API_KEY";

/// Overall wall-clock budget for one search, retry included
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default log verbosity
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Provider connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Name of the environment variable the API key is read from.
    ///
    /// Only the name lives here; the value is read again on every search.
    pub api_key_env: String,

    /// Base URL of the search API
    pub api_base: String,

    /// Overall budget shared by the first attempt and the retry
    pub timeout: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// Log rendering mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable lines
    Console,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "console" | "pretty" | "text" => Ok(LogFormat::Console),
            other => Err(format!("unknown log format '{other}' (expected json or console)")),
        }
    }
}

/// Logging settings, read once at process start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub format: LogFormat,

    /// `EnvFilter` directive, e.g. `info` or `perplexity_search=debug,warn`
    pub level: String,

    /// Optional log file; stderr is used when unset
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

/// Normalize a user supplied log level into an `EnvFilter` directive.
///
/// Accepts the usual level names plus the `warning`/`critical` spellings and
/// numeric levels (10 = debug ... 50 = error). Anything containing `=` or `,`
/// is treated as a full directive and passed through.
pub fn normalize_log_level(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    if value.contains('=') || value.contains(',') {
        return Some(value.to_string());
    }

    let level = match value.to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" | "critical" | "fatal" => "error",
        "off" => "off",
        numeric => match numeric.parse::<u32>().ok()? {
            0..=5 => "trace",
            6..=10 => "debug",
            11..=20 => "info",
            21..=30 => "warn",
            _ => "error",
        },
    };
    Some(level.to_string())
}
