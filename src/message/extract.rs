use crate::message::{char_len, take_chars};
use once_cell::sync::Lazy;
use regex::Regex;

/// Returned when there is no usable error text at all.
pub const FALLBACK: &str = "Alert triggered";

static DATA_QUERY_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[sse\.dataQueryError\]\s*").unwrap());
static LEADING_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[.*?\]\s*").unwrap());
static DIAL_TCP: Lazy<Regex> = Lazy::new(|| Regex::new(r"dial tcp ([\d\.]+):(\d+):").unwrap());
static POST_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"Post "([^"]+)""#).unwrap());

/// An error-shape recognizer. Rules are evaluated in order; the first
/// one producing a value wins.
struct ErrorRule {
    name: &'static str,
    apply: fn(&str) -> Option<String>,
}

const ERROR_RULES: &[ErrorRule] = &[
    ErrorRule {
        name: "connection-refused",
        apply: connection_refused,
    },
    ErrorRule {
        name: "http-post-failure",
        apply: http_post_failure,
    },
];

/// Extract the most useful human-readable fragment from a raw error or
/// annotation string. Never fails; unmatched input falls through to a
/// length-capped passthrough.
pub fn extract(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(text) if !text.is_empty() => text,
        _ => return FALLBACK.to_string(),
    };

    // Strip the Grafana data-query tag first, then any other leading bracketed tag
    let stripped = DATA_QUERY_TAG.replace(raw, "");
    let stripped = LEADING_TAG.replace(stripped.as_ref(), "");

    for rule in ERROR_RULES {
        if let Some(text) = (rule.apply)(&stripped) {
            tracing::debug!("Error text matched rule '{}'", rule.name);
            return text;
        }
    }

    if char_len(&stripped) > 100 {
        format!("{}...", take_chars(&stripped, 97))
    } else {
        stripped.into_owned()
    }
}

/// Recognize Go-style dial errors and reduce them to host:port
fn connection_refused(text: &str) -> Option<String> {
    if !text.to_lowercase().contains("connection refused") {
        return None;
    }

    let captures = DIAL_TCP.captures(text)?;

    Some(format!(
        "Connection refused to {}:{}",
        &captures[1], &captures[2]
    ))
}

/// Recognize failed HTTP POST errors, collapsing long URLs to their authority
fn http_post_failure(text: &str) -> Option<String> {
    let captures = POST_URL.captures(text)?;
    let url = captures.get(1)?.as_str();

    let url = if char_len(url) > 40 {
        // Keep just the hostname:port
        url.split('/').nth(2).unwrap_or(url)
    } else {
        url
    };

    Some(format!("Failed to connect to {url}"))
}
