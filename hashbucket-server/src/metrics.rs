//! Prometheus metrics collection for the HashBucket server

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

/// Initialize all metric descriptions
pub fn init_metrics() {
    describe_counter!("hashbucket_predictions_total", "Total number of prediction requests");
    describe_counter!("hashbucket_errors_total", "Total number of failed requests by error type");
    describe_counter!("hashbucket_health_checks_total", "Total number of health checks served");

    describe_histogram!("hashbucket_prediction_latency_seconds", "Prediction latency in seconds");
    describe_histogram!("hashbucket_num_buckets", "Bucket counts requested by callers");

    describe_gauge!("hashbucket_uptime_seconds", "Seconds since the server started");
}

/// Record a successful prediction
pub fn record_prediction(num_buckets: u64, latency_seconds: f64) {
    counter!("hashbucket_predictions_total", 1, "outcome" => "success");
    histogram!("hashbucket_prediction_latency_seconds", latency_seconds);
    histogram!("hashbucket_num_buckets", num_buckets as f64);
}

/// Record a failed request
pub fn record_error(error_type: &'static str) {
    counter!("hashbucket_predictions_total", 1, "outcome" => "error");
    counter!("hashbucket_errors_total", 1, "type" => error_type);
}

/// Record a health check
pub fn record_health_check() {
    counter!("hashbucket_health_checks_total", 1);
}

/// Update the uptime gauge
pub fn update_uptime(seconds: u64) {
    gauge!("hashbucket_uptime_seconds", seconds as f64);
}

/// Storage for Prometheus handle
static PROMETHEUS_HANDLE: std::sync::OnceLock<metrics_exporter_prometheus::PrometheusHandle> =
    std::sync::OnceLock::new();

/// Initialize Prometheus exporter and keep its handle for rendering
pub fn init_prometheus() -> anyhow::Result<()> {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let handle = builder.install_recorder()?;
    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| anyhow::anyhow!("Failed to set Prometheus handle"))?;
    Ok(())
}

/// Get Prometheus metrics string
pub fn get_prometheus_metrics() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Prometheus metrics not initialized\n".to_string())
}
