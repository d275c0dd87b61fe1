use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram, IntCounter,
    IntCounterVec, TextEncoder,
};

// Prometheus metrics (default registry)
pub static SNAPSHOT_FLUSHES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "research_portal_snapshot_flushes_total",
        "Snapshots successfully written to the backend"
    )
    .expect("register snapshot_flushes_total")
});

pub static SNAPSHOT_FLUSH_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "research_portal_snapshot_flush_failures_total",
        "Snapshot writes that failed and left the store dirty"
    )
    .expect("register snapshot_flush_failures_total")
});

pub static SNAPSHOT_FLUSH_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "research_portal_snapshot_flush_duration_seconds",
        "Snapshot serialize + write duration in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("register snapshot_flush_duration")
});

pub static SNAPSHOT_HYDRATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "research_portal_snapshot_hydrations_total",
        "Startup hydrations by outcome",
        &["outcome"]
    )
    .expect("register snapshot_hydrations_total")
});

pub static STORE_MUTATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "research_portal_store_mutations_total",
        "Applied store mutations by collection",
        &["collection"]
    )
    .expect("register store_mutations_total")
});

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
