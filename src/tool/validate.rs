//! Input validation for `perplexity_search`. Pure: no I/O, no logging.

use crate::error::SearchToolError;
use crate::tool::types::{SearchArgs, SearchRequest};
use serde_json::Value;

pub const MAX_QUERY_CHARS: usize = 4096;
pub const MIN_RESULTS: u32 = 1;
pub const MAX_RESULTS: u32 = 30;
pub const DEFAULT_RESULTS: u32 = 10;
pub const MAX_HOSTNAME_LEN: usize = 253;

/// Validate and normalize raw tool arguments.
pub fn validate(args: &SearchArgs) -> Result<SearchRequest, SearchToolError> {
    let query = validate_query(&args.query)?;
    let num_results = clamp_num_results(args.num_results.as_ref())?;
    let domain_filter = normalize_domain_filter(args.search_domain_filter.as_deref())?;

    Ok(SearchRequest {
        query,
        num_results,
        domain_filter,
    })
}

/// Trim the query and enforce 1..=4096 characters.
pub fn validate_query(raw: &str) -> Result<String, SearchToolError> {
    let query = raw.trim();
    if query.is_empty() {
        return Err(SearchToolError::validation(
            "empty query: query must be a non-empty string after trimming whitespace",
        ));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(SearchToolError::validation(format!(
            "query exceeds maximum length of {MAX_QUERY_CHARS} characters"
        )));
    }
    Ok(query.to_string())
}

/// Clamp the requested result count into 1..=30; absent or null means 10.
///
/// Integers, integral floats and integer strings are accepted.
pub fn clamp_num_results(raw: Option<&Value>) -> Result<u32, SearchToolError> {
    let not_integer = || SearchToolError::validation("num_results must be an integer");

    let requested: i64 = match raw {
        None | Some(Value::Null) => return Ok(DEFAULT_RESULTS),
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_i64() {
                v
            } else if n.as_u64().is_some() {
                i64::MAX
            } else {
                let f = n.as_f64().ok_or_else(not_integer)?;
                if !f.is_finite() || f.fract() != 0.0 {
                    return Err(not_integer());
                }
                // Saturating cast; anything this large clamps anyway.
                f as i64
            }
        }
        Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| not_integer())?,
        Some(_) => return Err(not_integer()),
    };

    Ok(requested.clamp(MIN_RESULTS as i64, MAX_RESULTS as i64) as u32)
}

/// Lower-case, validate and de-duplicate the domain allowlist.
///
/// `None` stays `None`. A provided list must contain at least one hostname
/// made of `[a-z0-9.-]`, each at most 253 characters. First occurrence wins.
pub fn normalize_domain_filter(
    raw: Option<&[String]>,
) -> Result<Option<Vec<String>>, SearchToolError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let mut domains: Vec<String> = Vec::with_capacity(raw.len());
    for (idx, entry) in raw.iter().enumerate() {
        let host = entry.trim().to_ascii_lowercase();
        if host.is_empty() {
            return Err(SearchToolError::validation(format!(
                "search_domain_filter[{idx}] is empty"
            )));
        }
        if host.len() > MAX_HOSTNAME_LEN {
            return Err(SearchToolError::validation(format!(
                "search_domain_filter[{idx}] exceeds {MAX_HOSTNAME_LEN} characters"
            )));
        }
        if !host.bytes().all(is_hostname_byte) {
            return Err(SearchToolError::validation(format!(
                "search_domain_filter[{idx}] is not a valid hostname (allowed: a-z, 0-9, '.', '-')"
            )));
        }
        if !domains.contains(&host) {
            domains.push(host);
        }
    }

    if domains.is_empty() {
        return Err(SearchToolError::validation(
            "search_domain_filter must contain at least one domain when provided",
        ));
    }

    Ok(Some(domains))
}

fn is_hostname_byte(b: u8) -> bool {
    matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'.' | b'-')
}
