//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementation of the stream port
//! defined in the application layer, plus startup configuration and
//! observability.

/// Configuration loaded from environment variables.
pub mod config;

/// gRPC client adapter for the DLMS processor.
pub mod grpc;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// OpenTelemetry tracing integration.
pub mod telemetry;
