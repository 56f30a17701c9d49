use indexmap::IndexMap;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Alert {
    pub status: String,
    // Insertion-ordered maps: the composer's catch-all rule picks the
    // first annotation in document order
    pub labels: IndexMap<String, String>,
    pub annotations: IndexMap<String, String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct WebhookPayload {
    pub status: String,
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome of processing one webhook batch. Partial success is the
/// steady state: failures and skips never abort the remaining alerts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchResult {
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
}
