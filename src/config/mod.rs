pub mod settings;

pub use settings::{LogFormat, LogSettings, ProviderSettings};

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the API base URL
pub const API_BASE_ENV: &str = "PERPLEXITY_API_BASE";
/// Environment variable overriding the overall search budget (milliseconds)
pub const TIMEOUT_ENV: &str = "PERPLEXITY_TIMEOUT_MS";
/// Environment variable selecting the log rendering mode
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
/// Environment variable selecting the log verbosity
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
/// Environment variable selecting a log file instead of stderr
pub const LOG_FILE_ENV: &str = "LOG_FILE";

/// Process-wide configuration, built once at startup and passed down by reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub provider: ProviderSettings,
    pub log: LogSettings,

    /// Problems found while reading the environment. Logging is not installed
    /// yet when the config is read, so these are reported after `logging::init`.
    pub notices: Vec<String>,
}

impl Config {
    /// Read the optional settings from the process environment.
    ///
    /// Every variable may be absent; defaults are JSON logs at `info` on stderr,
    /// the public API base and a 5000ms budget.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(base) = present(API_BASE_ENV) {
            config.provider.api_base = base.trim().to_string();
        }

        if let Some(raw) = present(TIMEOUT_ENV) {
            config.set_timeout_ms(&raw);
        }

        if let Some(raw) = present(LOG_FORMAT_ENV) {
            match raw.parse::<LogFormat>() {
                Ok(format) => config.log.format = format,
                Err(e) => config.notices.push(format!("{LOG_FORMAT_ENV}: {e}; using json")),
            }
        }

        if let Some(raw) = present(LOG_LEVEL_ENV) {
            config.set_log_level(&raw);
        }

        if let Some(path) = present(LOG_FILE_ENV) {
            config.log.file = Some(PathBuf::from(path.trim()));
        }

        config
    }

    /// Apply a verbosity override, keeping the previous level when unparseable.
    pub fn set_log_level(&mut self, raw: &str) {
        match settings::normalize_log_level(raw) {
            Some(level) => self.log.level = level,
            None => self.notices.push(format!(
                "{LOG_LEVEL_ENV}: unknown level '{}'; using {}",
                raw.trim(),
                self.log.level
            )),
        }
    }

    /// Apply a budget override in milliseconds; zero and garbage are rejected.
    pub fn set_timeout_ms(&mut self, raw: &str) {
        match raw.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => self.provider.timeout = Duration::from_millis(ms),
            _ => self.notices.push(format!(
                "{TIMEOUT_ENV}: invalid value '{}'; using {}ms",
                raw.trim(),
                self.provider.timeout.as_millis()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_absent_environment_uses_defaults() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert!(config.notices.is_empty());
    }

    #[test]
    fn test_environment_overrides() {
        let config = Config::from_lookup(lookup(&[
            (API_BASE_ENV, "http://localhost:9000 "),
            (TIMEOUT_ENV, "2500"),
            (LOG_FORMAT_ENV, "console"),
            (LOG_LEVEL_ENV, "debug"),
            (LOG_FILE_ENV, "/tmp/search.log"),
        ]));

        assert_eq!(config.provider.api_base, "http://localhost:9000");
        assert_eq!(config.provider.timeout, Duration::from_millis(2500));
        assert_eq!(config.log.format, LogFormat::Console);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.file, Some(PathBuf::from("/tmp/search.log")));
        assert!(config.notices.is_empty());
    }

    #[test]
    fn test_invalid_values_fall_back_with_notice() {
        let config = Config::from_lookup(lookup(&[
            (TIMEOUT_ENV, "0"),
            (LOG_FORMAT_ENV, "yaml"),
            (LOG_LEVEL_ENV, "chatty"),
        ]));

        assert_eq!(config.provider.timeout, Duration::from_millis(5000));
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.notices.len(), 3);
    }

    #[test]
    fn test_api_key_is_never_read_into_config() {
        let config = Config::from_lookup(lookup(&[("PERPLEXITY_API_KEY", "pplx-abcdefgh12345678")]));
        assert!(!format!("{config:?}").contains("pplx-abcdefgh12345678"));
    }
}
