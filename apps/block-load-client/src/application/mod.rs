//! Application Layer - Use cases and port definitions.
//!
//! This layer contains the request trigger and the port interface it
//! drives to reach the remote DLMS processor.

/// Port interfaces for external systems (processor stream).
pub mod ports;

/// Application services (block load profile request trigger).
pub mod services;
