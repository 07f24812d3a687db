//! Prometheus metrics infrastructure
//!
//! This module installs the Prometheus exporter and provides the
//! per-instrument metric set recorded by the bots.

use metrics::{counter, histogram, Counter, Histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Initialize the Prometheus metrics exporter
///
/// This starts an HTTP listener on the specified port that exposes metrics
/// at the `/metrics` endpoint.
///
/// # Example
///
/// ```ignore
/// observability::metrics::init_metrics(9100)?;
/// // Metrics available at http://localhost:9100/metrics
/// ```
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics server listening");
    Ok(())
}

/// Ingestion metrics for one instrument
///
/// # Metrics
///
/// * `positions_sent_total{symbol, outcome}` - Send attempts by outcome kind
/// * `ingest_request_duration_seconds{symbol}` - Time spent in each send
/// * `bot_rounds_completed_total{symbol}` - Finished rounds
///
/// Without an installed recorder every call is a no-op.
#[derive(Clone)]
pub struct IngestMetrics {
    symbol: String,
    request_duration: Histogram,
    rounds_completed: Counter,
}

impl IngestMetrics {
    pub fn new(symbol: &str) -> Self {
        let symbol = symbol.to_string();

        Self {
            request_duration: histogram!(
                "ingest_request_duration_seconds",
                "symbol" => symbol.clone()
            ),
            rounds_completed: counter!("bot_rounds_completed_total", "symbol" => symbol.clone()),
            symbol,
        }
    }

    /// Record one send attempt
    ///
    /// * `outcome` - machine-readable outcome kind (`success`, `connection_failure`, ...)
    pub fn record_send(&self, outcome: &'static str, duration: Duration) {
        counter!(
            "positions_sent_total",
            "symbol" => self.symbol.clone(),
            "outcome" => outcome
        )
        .increment(1);
        self.request_duration.record(duration.as_secs_f64());
    }

    pub fn round_completed(&self) {
        self.rounds_completed.increment(1);
    }
}
