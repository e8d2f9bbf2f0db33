//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gas_proxy_requests_total` (counter): requests by method, status
//! - `gas_proxy_request_duration_seconds` (histogram): end-to-end latency
//! - `gas_proxy_rejections_total` (counter): relay errors by reason
//! - `gas_proxy_upstream_duration_seconds` (histogram): upstream call latency
//! - `gas_proxy_upstream_failures_total` (counter): transport failures by kind

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start_time: Instant) {
    ::metrics::counter!(
        "gas_proxy_requests_total",
        "method" => method.to_owned(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("gas_proxy_request_duration_seconds")
        .record(start_time.elapsed().as_secs_f64());
}

pub fn record_rejection(reason: &'static str) {
    ::metrics::counter!("gas_proxy_rejections_total", "reason" => reason).increment(1);
}

/// `failure` is the error kind, or `None` when the upstream replied.
pub fn record_upstream(elapsed: Duration, failure: Option<&'static str>) {
    ::metrics::histogram!("gas_proxy_upstream_duration_seconds").record(elapsed.as_secs_f64());
    if let Some(kind) = failure {
        ::metrics::counter!("gas_proxy_upstream_failures_total", "kind" => kind).increment(1);
    }
}
