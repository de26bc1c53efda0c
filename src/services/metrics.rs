use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

use crate::error::UpstreamSource;

lazy_static! {
    /// Requests served, by endpoint and final status code
    static ref REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "xtream_requests_total",
        "Requests served by endpoint and status",
        &["endpoint", "status"]
    )
    .unwrap();

    /// Failed upstream fetches, by collaborator
    static ref UPSTREAM_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "xtream_upstream_failures_total",
        "Failed upstream fetches by source",
        &["source"]
    )
    .unwrap();
}

pub fn record_request(endpoint: &str, status: u16) {
    REQUESTS_TOTAL
        .with_label_values(&[endpoint, &status.to_string()])
        .inc();
}

pub fn record_upstream_failure(origin: UpstreamSource) {
    UPSTREAM_FAILURES_TOTAL
        .with_label_values(&[origin.as_str()])
        .inc();
}
