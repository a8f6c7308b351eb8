//! Block Load Client Binary
//!
//! Requests one block load profile stream from the DLMS processor and prints
//! every received record as a JSON line on stdout.
//!
//! # Usage
//!
//! ```bash
//! DLMS_PROCESSOR_URL=http://localhost:50051 cargo run --bin block-load-client
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `DLMS_PROCESSOR_URL`: Processor endpoint URI
//!
//! ## Optional
//! - `DLMS_PROCESSOR_CONNECT_TIMEOUT_SECS`: Transport connect timeout (default: 10)
//! - `BLOCK_LOAD_RETRIES`: Retries forwarded to the processor (default: 3)
//! - `BLOCK_LOAD_CONNECTION_TIMEOUT_SECS`: Meter connection timeout (default: 60)
//! - `BLOCK_LOAD_RETRY_DELAY_SECS`: Delay between retries (default: 5)
//! - `METER_IP`, `METER_PORT`, `METER_AUTH_PASSWORD`, `METER_SYSTEM_TITLE`,
//!   `METER_BLOCK_CIPHER_KEY`, `METER_AUTH_KEY`, `METER_CLIENT_ADDRESS`,
//!   `METER_SERVER_ADDRESS`, `METER_OBIS`: Meter overrides
//! - `METRICS_PORT`: Prometheus metrics port (default: 0, disabled)
//! - `OTEL_ENABLED`: Enable OpenTelemetry export (default: false)
//! - `RUST_LOG`: Log level (default: info)

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use block_load_client::infrastructure::telemetry;
use block_load_client::{
    ClientConfig, GrpcProfileClient, MeterConfigHolder, ProfileRecord, ProfileRequestTrigger,
    ProfileStore, StreamOutcome, init_metrics,
};
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let provider_installed = rustls::crypto::ring::default_provider()
        .install_default()
        .is_ok();

    load_dotenv();

    let _telemetry_guard = telemetry::init();

    tracing::info!("Starting block load client");
    if !provider_installed {
        tracing::debug!("rustls crypto provider already installed");
    }

    let config = ClientConfig::from_env()?;
    log_config(&config);

    init_metrics(config.metrics_port)?;

    let holder = MeterConfigHolder::new(config.meter.clone());
    let store = ProfileStore::new();
    let client = GrpcProfileClient::new(config.processor.clone());
    let trigger = ProfileRequestTrigger::new(Arc::new(client), holder, store.clone())
        .with_params(config.request);

    let _renderer = render_records(&store);

    let handle = trigger.start();
    tracing::info!(request_id = %handle.request_id(), "Block load profile requested");

    let outcome = handle.outcome();
    tokio::pin!(outcome);
    let outcome = tokio::select! {
        outcome = &mut outcome => outcome,
        () = shutdown_signal() => {
            trigger.cancel();
            outcome.await
        }
    };

    tracing::info!(
        records = outcome.records(),
        stored = store.len(),
        "Block load client finished"
    );

    match outcome {
        StreamOutcome::Failed { error, .. } => Err(error.into()),
        StreamOutcome::Completed { .. } | StreamOutcome::Cancelled { .. } => Ok(()),
    }
}

/// Print each newly appended record as a JSON line.
fn render_records(store: &ProfileStore) -> block_load_client::Subscription<Vec<ProfileRecord>> {
    let printed = AtomicUsize::new(0);
    store.subscribe(move |snapshot| {
        let mut stdout = std::io::stdout().lock();
        let rendered = render_new_records(&mut stdout, snapshot, printed.load(Ordering::SeqCst));
        let _ = stdout.flush();
        printed.store(rendered, Ordering::SeqCst);
    })
}

/// Write the records of `snapshot` not yet printed and return how many of
/// its records have now been printed.
///
/// A snapshot shorter than `printed` follows a reset and is printed from the
/// start.
fn render_new_records<W: Write>(
    out: &mut W,
    snapshot: &[ProfileRecord],
    printed: usize,
) -> usize {
    let from = if snapshot.len() < printed { 0 } else { printed };

    for record in &snapshot[from..] {
        match serde_json::to_string(record) {
            Ok(line) => {
                let _ = writeln!(out, "{line}");
            }
            Err(e) => tracing::warn!(error = %e, "Failed to render record"),
        }
    }

    snapshot.len()
}

fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

fn log_config(config: &ClientConfig) {
    tracing::info!(
        endpoint = %config.processor.endpoint,
        meter = %config.meter.endpoint_label(),
        obis = %config.meter.obis,
        retries = config.request.retries,
        connection_timeout_secs = config.request.connection_timeout.as_secs(),
        retry_delay_secs = config.request.retry_delay.as_secs(),
        metrics_port = config.metrics_port,
        "Configuration loaded"
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, cancelling stream");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, cancelling stream");
        }
    }
}
