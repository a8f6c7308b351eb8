//! gRPC Client Adapter
//!
//! Implements `ProfileStreamPort` on top of the `DLMSProcessor` service.
//!
//! # Architecture
//!
//! Each `open` call:
//!
//! 1. Connects a fresh channel to the configured processor endpoint
//! 2. Converts the domain request into its wire form
//! 3. Issues one server-streaming `GetBlockLoadProfile` call
//! 4. Maps every streamed response into a domain record as it is decoded

pub mod client;

// Allow clippy warnings and missing docs in generated code
#[allow(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
pub mod proto {
    pub mod dlmsprocessor {
        include!("proto/dlmsprocessor.rs");
    }
}

pub use client::GrpcProfileClient;
