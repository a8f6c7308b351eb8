//! Meter Configuration
//!
//! The addressing, credential and selector bundle identifying which meter
//! and which data point a block load profile request targets.
//!
//! Configuration is held as a whole value: readers take a snapshot, writers
//! replace it wholesale. Fields are not validated here; a malformed address
//! or key surfaces later as a failure from the remote processor.

use std::sync::Arc;

use crate::domain::store::{Atom, Subscription};

// =============================================================================
// Defaults
// =============================================================================

/// Default meter network address.
pub const DEFAULT_METER_IP: &str = "2401:4900:833f:2688:0000:0000:0000:0002";

/// Default meter TCP port (DLMS wrapper).
pub const DEFAULT_METER_PORT: u16 = 4059;

/// Default low level authentication password.
pub const DEFAULT_AUTH_PASSWORD: &str = "0000000000000000";

/// Default client system title ("abcdefgh" in hex).
pub const DEFAULT_SYSTEM_TITLE: &str = "6162636465666768";

/// Default block cipher and authentication key ("IB01IB02IB03IB04" in hex).
pub const DEFAULT_SECURITY_KEY: &str = "49423031494230324942303349423034";

/// Default client logical address.
pub const DEFAULT_CLIENT_ADDRESS: &str = "48";

/// Default server logical address.
pub const DEFAULT_SERVER_ADDRESS: &str = "1";

/// Default OBIS code.
pub const DEFAULT_OBIS: &str = "1.0.1.8.0.255";

// =============================================================================
// Meter Configuration
// =============================================================================

/// Connection and selector settings for one meter.
#[derive(Clone, PartialEq, Eq)]
pub struct MeterConfig {
    /// Meter network address (IPv4 or IPv6).
    pub ip: String,
    /// Meter TCP port.
    pub port: u16,
    /// Authentication password (hex).
    pub auth_password: String,
    /// Client system title (hex).
    pub system_title: String,
    /// Block cipher key (hex).
    pub block_cipher_key: String,
    /// Authentication key (hex).
    pub auth_key: String,
    /// Client logical address.
    pub client_address: String,
    /// Server logical address.
    pub server_address: String,
    /// OBIS code selecting the data point.
    pub obis: String,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            ip: DEFAULT_METER_IP.to_string(),
            port: DEFAULT_METER_PORT,
            auth_password: DEFAULT_AUTH_PASSWORD.to_string(),
            system_title: DEFAULT_SYSTEM_TITLE.to_string(),
            block_cipher_key: DEFAULT_SECURITY_KEY.to_string(),
            auth_key: DEFAULT_SECURITY_KEY.to_string(),
            client_address: DEFAULT_CLIENT_ADDRESS.to_string(),
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            obis: DEFAULT_OBIS.to_string(),
        }
    }
}

impl MeterConfig {
    /// Socket-style label used in logs (`[ip]:port`).
    #[must_use]
    pub fn endpoint_label(&self) -> String {
        if self.ip.contains(':') {
            format!("[{}]:{}", self.ip, self.port)
        } else {
            format!("{}:{}", self.ip, self.port)
        }
    }
}

impl std::fmt::Debug for MeterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeterConfig")
            .field("ip", &self.ip)
            .field("port", &self.port)
            .field("auth_password", &"[REDACTED]")
            .field("system_title", &self.system_title)
            .field("block_cipher_key", &"[REDACTED]")
            .field("auth_key", &"[REDACTED]")
            .field("client_address", &self.client_address)
            .field("server_address", &self.server_address)
            .field("obis", &self.obis)
            .finish()
    }
}

// =============================================================================
// Configuration Holder
// =============================================================================

/// Holds the current meter configuration.
///
/// Cloning the holder shares the underlying value, so the trigger and any
/// editor front end see the same configuration.
#[derive(Debug, Clone)]
pub struct MeterConfigHolder {
    current: Atom<MeterConfig>,
}

impl Default for MeterConfigHolder {
    fn default() -> Self {
        Self::new(MeterConfig::default())
    }
}

impl MeterConfigHolder {
    /// Create a holder with an initial configuration.
    #[must_use]
    pub fn new(initial: MeterConfig) -> Self {
        Self {
            current: Atom::new(initial),
        }
    }

    /// Read the current configuration.
    #[must_use]
    pub fn get(&self) -> MeterConfig {
        MeterConfig::clone(&self.current.get())
    }

    /// Shared snapshot of the current configuration.
    #[must_use]
    pub fn snapshot(&self) -> Arc<MeterConfig> {
        self.current.get()
    }

    /// Replace the configuration.
    pub fn set(&self, config: MeterConfig) {
        tracing::debug!(meter = %config.endpoint_label(), obis = %config.obis, "Meter configuration replaced");
        self.current.set(config);
    }

    /// Observe the configuration, starting with the current value.
    pub fn subscribe<F>(&self, listener: F) -> Subscription<MeterConfig>
    where
        F: Fn(&Arc<MeterConfig>) + Send + Sync + 'static,
    {
        self.current.subscribe(listener)
    }
}

// =============================================================================
// Tests
// =============================================================================
