use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Storage Metrics (one label per cell key)
    pub static ref STORAGE_LOADS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "storage_loads_total",
        "Cell initialisations by outcome (restored, missing, fallback)",
        &["key", "outcome"]
    )
    .unwrap();

    pub static ref STORAGE_WRITES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "storage_writes_total",
        "Cell writes by outcome (persisted, dropped)",
        &["key", "outcome"]
    )
    .unwrap();

    pub static ref STORAGE_WRITE_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "storage_write_duration_seconds",
        "Serialization plus storage write duration in seconds",
        &["key"],
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1]
    )
    .unwrap();

    // Business Metrics
    pub static ref PORTAL_EVENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "portal_events_total",
        "Domain events (login, signup, project_created, quiz_submitted, ...)",
        &["event", "status"]
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

/// Helper: count a domain event
pub fn record_event(event: &str, success: bool) {
    let status = if success { "success" } else { "rejected" };
    PORTAL_EVENTS_TOTAL
        .with_label_values(&[event, status])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        let _ = HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/health", "200"])
            .get();
        let _ = STORAGE_WRITES_TOTAL
            .with_label_values(&["users", "persisted"])
            .get();
    }

    #[test]
    fn test_render_metrics() {
        record_event("login", true);

        let output = render_metrics().unwrap();
        assert!(output.contains("portal_events_total"));
    }
}
