//! Prometheus Metrics Module
//!
//! Exposes block load streaming metrics in Prometheus format.
//!
//! # Metrics Categories
//!
//! - **Requests**: streams opened, superseded, and finished by outcome
//! - **Records**: records appended to the result store
//! - **Streams**: active stream gauge and stream duration
//!
//! # Integration
//!
//! When `METRICS_PORT` is non-zero, metrics are served at `/metrics` on that
//! port. Without an installed recorder every call below is a no-op.

use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::application::services::StreamOutcome;

// =============================================================================
// Global Recorder
// =============================================================================

static METRICS_LISTENER: OnceLock<SocketAddr> = OnceLock::new();

/// Install the Prometheus recorder with an HTTP listener on `port`.
///
/// Does nothing when `port` is zero or a listener is already installed.
/// Must be called from within a tokio runtime.
///
/// # Errors
///
/// Returns an error if the recorder or listener cannot be installed.
pub fn init_metrics(port: u16) -> Result<(), BuildError> {
    if port == 0 || METRICS_LISTENER.get().is_some() {
        return Ok(());
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    let _ = METRICS_LISTENER.set(addr);

    register_metrics();
    tracing::info!(%addr, "Prometheus metrics listener started");
    Ok(())
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "block_load_requests_total",
        "Total block load profile streams opened"
    );
    describe_counter!(
        "block_load_records_received_total",
        "Total block load profile records appended to the result store"
    );
    describe_counter!(
        "block_load_streams_finished_total",
        "Total block load profile streams finished, by outcome"
    );
    describe_counter!(
        "block_load_streams_superseded_total",
        "Total in-flight streams cancelled by a newer request"
    );
    describe_gauge!(
        "block_load_active_streams",
        "Number of block load profile streams in flight"
    );
    describe_histogram!(
        "block_load_stream_duration_seconds",
        "Time from opening a stream to its terminal event"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Record a stream being opened.
pub fn record_request_started() {
    counter!("block_load_requests_total").increment(1);
    gauge!("block_load_active_streams").increment(1.0);
}

/// Record a record appended to the store.
pub fn record_record_received() {
    counter!("block_load_records_received_total").increment(1);
}

/// Record an in-flight stream superseded by a new request.
pub fn record_stream_superseded() {
    counter!("block_load_streams_superseded_total").increment(1);
}

/// Record a stream reaching its terminal event.
pub fn record_stream_finished(outcome: &StreamOutcome, duration: Duration) {
    counter!(
        "block_load_streams_finished_total",
        "outcome" => outcome_label(outcome)
    )
    .increment(1);
    gauge!("block_load_active_streams").decrement(1.0);
    histogram!(
        "block_load_stream_duration_seconds",
        "outcome" => outcome_label(outcome)
    )
    .record(duration.as_secs_f64());
}

const fn outcome_label(outcome: &StreamOutcome) -> &'static str {
    match outcome {
        StreamOutcome::Completed { .. } => "completed",
        StreamOutcome::Cancelled { .. } => "cancelled",
        StreamOutcome::Failed { error, .. } => error.kind(),
    }
}

// =============================================================================
// Tests
// =============================================================================
