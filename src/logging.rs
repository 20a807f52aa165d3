use crate::config::{LogFormat, LogSettings};
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

#[allow(dead_code)]
pub struct LogGuard(tracing_appender::non_blocking::WorkerGuard);

/// Install the process-wide subscriber.
///
/// Logs go to stderr unless a log file is configured, because stdout carries
/// the MCP protocol. Returns a guard that must be held for the life of the
/// process when a file sink is used.
pub fn init(settings: &LogSettings) -> Result<Option<LogGuard>> {
    let Some(raw_path) = settings.file.as_deref() else {
        let ansi = settings.format == LogFormat::Console && std::io::stderr().is_terminal();
        let subscriber = build_subscriber(settings, std::io::stderr, ansi);
        // If already initialized (e.g., in tests), don't crash.
        tracing::subscriber::set_global_default(subscriber).ok();
        return Ok(None);
    };

    let log_path = resolve_log_path(raw_path);
    ensure_parent_dir(&log_path)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(file);
    let subscriber = build_subscriber(settings, writer, false);
    tracing::subscriber::set_global_default(subscriber).ok();

    tracing::info!(log_file = %log_path.display(), "writing logs to file");

    Ok(Some(LogGuard(guard)))
}

/// Build a subscriber for the configured format and level over any writer.
pub fn build_subscriber<W>(
    settings: &LogSettings,
    writer: W,
    ansi: bool,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(&settings.level))
        .with_target(true)
        .with_writer(writer);

    match settings.format {
        LogFormat::Json => Box::new(
            builder
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .finish(),
        ),
        LogFormat::Console => Box::new(builder.with_ansi(ansi).finish()),
    }
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn resolve_log_path(raw: &Path) -> PathBuf {
    let Some(text) = raw.to_str() else {
        return raw.to_path_buf();
    };
    PathBuf::from(expand_tilde(text))
}

fn expand_tilde(raw: &str) -> String {
    if raw == "~" || raw.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            let suffix = raw.strip_prefix('~').unwrap_or("");
            return format!("{}{}", home.display(), suffix);
        }
    }
    raw.to_string()
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    Ok(())
}

const REDACTED: &str = "***REDACTED***";

const KEY_PREFIXES: &[&str] = &["pplx-"];
const SECRET_PREFIXES: &[&str] = &["pplx-", "Bearer "];

/// Best-effort redaction for Perplexity API keys (`pplx-...`) and bearer tokens.
///
/// Meant for provider error bodies and transport errors. Caller text goes
/// through [`redact_user_text`] instead.
pub fn redact_secrets(input: &str) -> String {
    mask_prefixed(input, SECRET_PREFIXES)
}

/// Redaction for caller-supplied text such as the query and domain filter.
///
/// Masks the live credential when known plus `pplx-` keys; ordinary words
/// after `Bearer` are left alone.
pub fn redact_user_text(input: &str, secret: Option<&str>) -> String {
    let masked = match secret {
        Some(secret) if !secret.is_empty() => input.replace(secret, REDACTED),
        _ => input.to_string(),
    };
    mask_prefixed(&masked, KEY_PREFIXES)
}

fn mask_prefixed(input: &str, prefixes: &[&str]) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut last = 0usize;
    let mut i = 0usize;

    while i < input.len() {
        let prefix = prefixes.iter().copied().find(|p| input[i..].starts_with(p));

        if let Some(prefix) = prefix {
            let start = i + prefix.len();
            let mut j = start;
            while j < input.len() {
                match bytes[j] {
                    b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' => j += 1,
                    _ => break,
                }
            }

            // Require a minimum length to reduce false positives.
            if j - start >= 8 {
                out.push_str(&input[last..i]);
                out.push_str(prefix);
                out.push_str(REDACTED);
                last = j;
                i = j;
                continue;
            }
        }

        i += input[i..].chars().next().map_or(1, char::len_utf8);
    }

    out.push_str(&input[last..]);
    out
}

/// Mask every occurrence of a known secret, then apply [`redact_secrets`].
pub fn redact_value(input: &str, secret: &str) -> String {
    let masked = if secret.is_empty() {
        input.to_string()
    } else {
        input.replace(secret, REDACTED)
    };
    redact_secrets(&masked)
}
