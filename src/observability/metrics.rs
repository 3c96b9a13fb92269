//! Metrics collection and exposition.
//!
//! # Metrics
//! - `score_board_requests_total` (counter): requests by method, status
//! - `score_board_request_duration_seconds` (histogram): latency distribution
//! - `score_board_records_inserted_total` (counter): new keys persisted
//! - `score_board_duplicate_submissions_total` (counter): submissions for existing keys
//! - `score_board_records` (gauge): records currently in the store
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "score_board_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("score_board_request_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

pub fn record_submission(inserted: bool) {
    if inserted {
        metrics::counter!("score_board_records_inserted_total").increment(1);
    } else {
        metrics::counter!("score_board_duplicate_submissions_total").increment(1);
    }
}

pub fn record_store_size(records: usize) {
    metrics::gauge!("score_board_records").set(records as f64);
}
