use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::time::Instant;

pub static METRICS_HANDLE: OnceCell<Option<PrometheusHandle>> = OnceCell::new();

/// Register the metrics for the application
pub fn register_metrics() {
    let builder = PrometheusBuilder::new();

    let handle = builder
        .install_recorder()
        .expect("Failed to install recorder");

    METRICS_HANDLE
        .set(Some(handle.clone()))
        .unwrap_or_else(|_| {
            panic!("Failed to set the metrics handle");
        });

    // Number of HTTP requests per endpoint
    describe_counter!(
        "http_requests_total",
        "Total number of HTTP requests per endpoint"
    );

    // Latency of serving HTTP requests per endpoint
    describe_histogram!(
        "http_request_duration_seconds",
        "Duration of HTTP requests in seconds per endpoint"
    );

    // Webhook requests rejected before processing. Labeled with the reason.
    describe_counter!(
        "webhook_rejected_total",
        "Total number of webhook requests rejected before processing"
    );

    describe_counter!("sms_sent_total", "Total number of SMS messages sent");

    describe_counter!(
        "sms_failed_total",
        "Total number of SMS messages the gateway failed to accept"
    );

    describe_counter!(
        "sms_skipped_total",
        "Total number of alerts skipped for lack of a destination number"
    );

    // Timestamp of the last fully processed webhook batch
    describe_gauge!(
        "last_webhook_timestamp",
        "Timestamp of the last fully processed webhook batch"
    );
}

/// Record an HTTP request for a given endpoint
pub fn record_http_request(endpoint: &str) {
    counter!("http_requests_total", "endpoint" => endpoint.to_string()).increment(1);
}

/// Create a timer for an HTTP request to a given endpoint
pub fn http_request_timer(endpoint: &str) -> Timer {
    Timer::new().with_label("endpoint", endpoint.to_string())
}

/// Record a webhook request rejected before any alert was processed
pub fn record_webhook_rejected(reason: &'static str) {
    counter!("webhook_rejected_total", "reason" => reason).increment(1);
}

/// Record the timestamp of the last fully processed webhook batch
pub fn record_webhook_processed() {
    let timestamp = chrono::Utc::now().timestamp() as f64;

    gauge!("last_webhook_timestamp").set(timestamp);
}

pub fn record_sms_sent() {
    counter!("sms_sent_total").increment(1);
}

pub fn record_sms_failed() {
    counter!("sms_failed_total").increment(1);
}

pub fn record_sms_skipped() {
    counter!("sms_skipped_total").increment(1);
}

pub struct Timer {
    start_time: Instant,
    labels: Vec<(String, String)>,
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            labels: Vec::new(),
        }
    }

    /// Add a label to the timer
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push((key.into(), value.into()));
        self
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start_time.elapsed().as_secs_f64();

        if self.labels.is_empty() {
            histogram!("http_request_duration_seconds").record(duration);
        } else {
            let labels: Vec<_> = self
                .labels
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();

            histogram!("http_request_duration_seconds", &labels).record(duration);
        }
    }
}
