//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_responses_hardened_total` (counter): responses hardened, by status
//! - `security_audit_events_total` (counter): audit records, by reason
//! - `security_audit_dropped_total` (counter): audit records lost to sink errors
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exporter is opt-in via `observability.metrics_enabled`

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Starts the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_hardened(status: u16) {
    ::metrics::counter!("http_responses_hardened_total", "status" => status.to_string())
        .increment(1);
}

pub fn record_audit_event(reason: &'static str) {
    ::metrics::counter!("security_audit_events_total", "reason" => reason).increment(1);
}

pub fn record_audit_dropped() {
    ::metrics::counter!("security_audit_dropped_total").increment(1);
}
