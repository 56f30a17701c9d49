use crate::alert::Alert;
use crate::message::{
    char_len, extract::extract, GLYPH_FIRING, GLYPH_LOCATION, GLYPH_RESOLVED, GLYPH_WARNING,
};

const DEFAULT_ALERT_NAME: &str = "Unknown Alert";
const DEFAULT_CONTENT: &str = "Alert condition met";

/// How a matched annotation value is turned into message content.
enum Treatment {
    /// Run through the error-text extractor
    Extracted,
    /// Use as-is
    Verbatim,
}

struct ContentSource {
    key: &'static str,
    treatment: Treatment,
}

/// Annotation keys tried in priority order. First non-empty value wins.
const CONTENT_SOURCES: &[ContentSource] = &[
    ContentSource {
        key: "Error",
        treatment: Treatment::Extracted,
    },
    ContentSource {
        key: "error",
        treatment: Treatment::Extracted,
    },
    ContentSource {
        key: "summary",
        treatment: Treatment::Verbatim,
    },
    ContentSource {
        key: "description",
        treatment: Treatment::Verbatim,
    },
];

/// Keys never picked up by the catch-all scan.
const CATCH_ALL_EXCLUDED: &[&str] = &["summary", "description", "grafana_state_reason"];

/// Build the full SMS body for one alert: status prefix, alert name,
/// extracted content, optional instance line.
pub fn compose(alert: &Alert) -> String {
    let alert_name = alert
        .labels
        .get("alertname")
        .map(String::as_str)
        .unwrap_or(DEFAULT_ALERT_NAME);

    let content = resolve_content(alert);

    let (prefix, status_text) = match alert.status.as_str() {
        "firing" => (format!("{GLYPH_FIRING} "), "ALERT".to_string()),
        "resolved" => (format!("{GLYPH_RESOLVED} "), "RESOLVED".to_string()),
        other => (format!("{GLYPH_WARNING} "), other.to_uppercase()),
    };

    let mut message = format!("{prefix}{status_text}: {alert_name}");

    // Short content stays on the status line, long content gets its own
    if !content.is_empty() {
        if char_len(&content) < 50 {
            message.push_str(" - ");
            message.push_str(&content);
        } else {
            message.push('\n');
            message.push_str(&content);
        }
    }

    if let Some(instance) = resolve_instance(alert) {
        message.push('\n');
        message.push_str(GLYPH_LOCATION);
        message.push(' ');
        message.push_str(instance);
    }

    message
}

/// Pick the most relevant annotation value for the message body
fn resolve_content(alert: &Alert) -> String {
    for source in CONTENT_SOURCES {
        if let Some(value) = alert
            .annotations
            .get(source.key)
            .filter(|value| !value.is_empty())
        {
            return match source.treatment {
                Treatment::Extracted => extract(Some(value)),
                Treatment::Verbatim => value.clone(),
            };
        }
    }

    // Fall back to the first annotation that is not a known metadata key
    for (key, value) in &alert.annotations {
        if !CATCH_ALL_EXCLUDED.contains(&key.to_lowercase().as_str()) {
            return extract(Some(value));
        }
    }

    DEFAULT_CONTENT.to_string()
}

/// Resolve the instance/endpoint label, reduced to bare host[:port] when long
fn resolve_instance(alert: &Alert) -> Option<&str> {
    let instance = alert
        .labels
        .get("instance")
        .filter(|value| !value.is_empty())
        .or_else(|| alert.labels.get("endpoint").filter(|value| !value.is_empty()))?;

    let mut instance = instance.as_str();

    if char_len(instance) > 30 {
        if let Some((_, after_scheme)) = instance.split_once("://") {
            instance = after_scheme;
        }
        if let Some((host, _)) = instance.split_once('/') {
            instance = host;
        }
    }

    Some(instance)
}
