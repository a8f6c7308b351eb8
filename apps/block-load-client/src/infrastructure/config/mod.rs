//! Configuration Module
//!
//! Configuration loading for the block load client.

mod settings;

pub use settings::{ClientConfig, ConfigError, ProcessorSettings};
