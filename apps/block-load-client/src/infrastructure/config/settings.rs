//! Client Configuration Settings
//!
//! Configuration types for the block load client, loaded from environment
//! variables.

use std::time::Duration;

use crate::domain::meter::MeterConfig;
use crate::domain::profile::RequestParams;

/// Environment variable holding the processor endpoint.
const PROCESSOR_URL_VAR: &str = "DLMS_PROCESSOR_URL";

/// Default transport connect timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote processor connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorSettings {
    /// Processor endpoint URI (for example `http://localhost:50051`).
    pub endpoint: String,
    /// Local transport connect timeout. Not forwarded to the processor.
    pub connect_timeout: Duration,
}

impl ProcessorSettings {
    /// Settings for `endpoint` with the default connect timeout.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Remote processor settings.
    pub processor: ProcessorSettings,
    /// Parameters forwarded with every request.
    pub request: RequestParams,
    /// Initial meter configuration.
    pub meter: MeterConfig,
    /// Prometheus metrics port (0 = disabled).
    pub metrics_port: u16,
}

impl ClientConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `DLMS_PROCESSOR_URL` is missing or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// Optional values that are missing or fail to parse fall back to their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `DLMS_PROCESSOR_URL` is missing or empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup(PROCESSOR_URL_VAR)
            .ok_or_else(|| ConfigError::MissingEnvVar(PROCESSOR_URL_VAR.to_string()))?;
        let endpoint = endpoint.trim().to_string();
        if endpoint.is_empty() {
            return Err(ConfigError::EmptyValue(PROCESSOR_URL_VAR.to_string()));
        }

        let processor = ProcessorSettings {
            endpoint,
            connect_timeout: parse_duration_secs(
                &lookup,
                "DLMS_PROCESSOR_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT,
            ),
        };

        let defaults = RequestParams::default();
        let request = RequestParams {
            retries: parse_u32(&lookup, "BLOCK_LOAD_RETRIES", defaults.retries),
            connection_timeout: parse_duration_secs(
                &lookup,
                "BLOCK_LOAD_CONNECTION_TIMEOUT_SECS",
                defaults.connection_timeout,
            ),
            retry_delay: parse_duration_secs(
                &lookup,
                "BLOCK_LOAD_RETRY_DELAY_SECS",
                defaults.retry_delay,
            ),
        };

        let base = MeterConfig::default();
        let meter = MeterConfig {
            ip: parse_string(&lookup, "METER_IP", base.ip),
            port: parse_u16(&lookup, "METER_PORT", base.port),
            auth_password: parse_string(&lookup, "METER_AUTH_PASSWORD", base.auth_password),
            system_title: parse_string(&lookup, "METER_SYSTEM_TITLE", base.system_title),
            block_cipher_key: parse_string(
                &lookup,
                "METER_BLOCK_CIPHER_KEY",
                base.block_cipher_key,
            ),
            auth_key: parse_string(&lookup, "METER_AUTH_KEY", base.auth_key),
            client_address: parse_string(&lookup, "METER_CLIENT_ADDRESS", base.client_address),
            server_address: parse_string(&lookup, "METER_SERVER_ADDRESS", base.server_address),
            obis: parse_string(&lookup, "METER_OBIS", base.obis),
        };

        Ok(Self {
            processor,
            request,
            meter,
            metrics_port: parse_u16(&lookup, "METRICS_PORT", 0),
        })
    }
}

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
}

fn parse_string<F>(lookup: &F, key: &str, default: String) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.is_empty()).unwrap_or(default)
}

fn parse_u16<F>(lookup: &F, key: &str, default: u16) -> u16
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_u32<F>(lookup: &F, key: &str, default: u32) -> u32
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_duration_secs<F>(lookup: &F, key: &str, default: Duration) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}
