//! Domain Layer - Core meter types and observable state.
//!
//! This layer contains the meter configuration, block load profile records,
//! and the reactive containers that publish them. Nothing here knows about
//! gRPC. The containers use tokio channels only to expose their change
//! streams; reads and writes are synchronous.

/// Meter configuration and its holder.
pub mod meter;

/// Block load profile records and request parameters.
pub mod profile;

/// Observable state containers.
pub mod store;
