//! Prometheus metrics for snapshot storage

use once_cell::sync::Lazy;
use prometheus::{register_counter, register_counter_vec, Counter, CounterVec, Encoder, TextEncoder};

pub static SNAPSHOT_STORE_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "vantage_snapshot_store_total",
        "Snapshot store attempts",
        &["status"]
    )
    .unwrap()
});

pub static SNAPSHOT_BYTES: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "vantage_snapshot_bytes_total",
        "Encoded bytes of successfully stored snapshots"
    )
    .unwrap()
});

/// Render all registered metrics to Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}
