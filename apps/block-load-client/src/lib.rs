#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Block Load Client - DLMS Processor Streaming Client
//!
//! Requests block load profiles from a remote DLMS processor over a
//! server-streaming gRPC call and republishes each record, as it arrives,
//! through an observable result store.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Meter configuration, profile records, observable containers
//!   - `meter`: Meter configuration and its holder
//!   - `profile`: Records and requests
//!   - `store`: `Atom` container and the accumulated result store
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Interface to the remote profile stream
//!   - `services`: Request trigger and its phase state machine
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `grpc`: tonic client for the `DLMSProcessor` service
//!   - `config`: Environment configuration
//!   - `metrics`: Prometheus instrumentation
//!   - `telemetry`: Logging and OpenTelemetry export
//!
//! # Data Flow
//!
//! ```text
//! MeterConfigHolder ──► ProfileRequestTrigger ──► GrpcProfileClient ──► DLMS processor
//!                              │                                            │
//!                              │ reset                         record stream│
//!                              ▼                                            │
//!                        ProfileStore ◄──────────── append_for ─────────────┘
//!                              │
//!                              └──► observers (subscribe / changes)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core types with no transport dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::meter::{MeterConfig, MeterConfigHolder};
pub use domain::profile::{BlockLoadProfile, ProfileRecord, ProfileRequest, RequestParams};
pub use domain::store::{Atom, Changes, ProfileSnapshot, ProfileStore, StoreEpoch, Subscription};

// Application
pub use application::ports::{ClientError, ProfileStream, ProfileStreamPort};
pub use application::services::{
    ProfileRequestTrigger, RequestHandle, StreamOutcome, StreamPhase,
};

// Infrastructure config
pub use infrastructure::config::{ClientConfig, ConfigError, ProcessorSettings};

// gRPC client (and wire types for integration tests)
pub use infrastructure::grpc::{GrpcProfileClient, proto::dlmsprocessor as proto};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
