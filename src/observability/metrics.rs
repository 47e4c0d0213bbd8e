//! Metrics collection and exposition.
//!
//! # Metrics
//! - `job_relay_attempts_total` (counter): transport attempts by method, outcome
//! - `job_relay_retries_total` (counter): retries scheduled by method
//! - `job_relay_requests_exhausted_total` (counter): requests that used every attempt
//! - `job_relay_rate_limit_wait_seconds` (histogram): time spent waiting for a token
//! - `job_relay_dispatch_total` (counter): job submissions by job type, outcome
//! - `job_relay_polls_total` (counter): poll calls by outcome
//! - `job_relay_poll_fetches` (histogram): fetches performed per poll call
//!
//! Recording is a no-op until a recorder is installed with [`init_metrics`].

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_attempt(method: &str, outcome: &'static str) {
    ::metrics::counter!(
        "job_relay_attempts_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_retry(method: &str) {
    ::metrics::counter!("job_relay_retries_total", "method" => method.to_string()).increment(1);
}

pub fn record_exhausted(method: &str) {
    ::metrics::counter!("job_relay_requests_exhausted_total", "method" => method.to_string())
        .increment(1);
}

pub fn record_rate_limit_wait(waited: Duration) {
    ::metrics::histogram!("job_relay_rate_limit_wait_seconds").record(waited.as_secs_f64());
}

pub fn record_dispatch(job_type: &str, outcome: &'static str) {
    ::metrics::counter!(
        "job_relay_dispatch_total",
        "job_type" => job_type.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_poll(outcome: &'static str, fetches: u32) {
    ::metrics::counter!("job_relay_polls_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("job_relay_poll_fetches").record(fetches as f64);
}
