/// Metrics and telemetry for the gateway
///
/// Prometheus-compatible metrics for monitoring:
/// - Store operation counts, failures, and latencies
/// - Upload and retrieval outcomes

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    /// Operations issued to the content store by type
    pub static ref STORE_OPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "gateway_store_operations_total",
        "Total operations issued to the content store",
        &["operation"]
    )
    .unwrap();

    /// Store operations that failed, by type
    pub static ref STORE_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "gateway_store_errors_total",
        "Store operations that failed",
        &["operation"]
    )
    .unwrap();

    /// Store operation latencies in seconds
    ///
    /// For retrievals this measures time to response headers; body transfer
    /// is client-paced.
    pub static ref STORE_OP_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "gateway_store_operation_duration_seconds",
        "Store operation latencies in seconds",
        &["operation"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .unwrap();

    /// Upload requests by outcome
    pub static ref UPLOADS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "gateway_uploads_total",
        "Upload requests by outcome",
        &["outcome"]
    )
    .unwrap();

    /// Retrieval requests by outcome
    pub static ref RETRIEVALS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "gateway_retrievals_total",
        "Retrieval requests by outcome",
        &["outcome"]
    )
    .unwrap();
}

/// Render all registered metrics in Prometheus text format
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_includes_registered_metrics() {
        STORE_OPS_TOTAL.with_label_values(&["add"]).inc();
        UPLOADS_TOTAL.with_label_values(&["ok"]).inc();

        let output = gather();
        assert!(output.contains("gateway_store_operations_total"));
        assert!(output.contains("gateway_uploads_total"));
    }
}
