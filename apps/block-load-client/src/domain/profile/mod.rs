//! Block Load Profile Types
//!
//! Records streamed back by the DLMS processor and the request that asks
//! for them. These types are transport-agnostic; the gRPC adapter converts
//! them to and from the wire schema.

use std::time::Duration;

use serde::Serialize;

use crate::domain::meter::MeterConfig;

// =============================================================================
// Records
// =============================================================================

/// One block load profile entry read from a meter.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BlockLoadProfile {
    /// Meter clock timestamp for the block, as reported by the meter.
    pub date_time: String,
    /// Average voltage over the block (V).
    pub average_voltage: f64,
    /// Imported active energy for the block (Wh).
    pub block_energy_wh_import: f64,
    /// Imported apparent energy for the block (VAh).
    pub block_energy_vah_import: f64,
    /// Exported active energy for the block (Wh).
    pub block_energy_wh_export: f64,
    /// Exported apparent energy for the block (VAh).
    pub block_energy_vah_export: f64,
    /// Average current over the block (A).
    pub average_current: f64,
    /// Meter health indicator.
    pub meter_health_indicator: u8,
}

/// One streamed response: the originating meter and its profile entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileRecord {
    /// Address of the meter that produced the entry.
    pub meter_ip: String,
    /// Measurement payload.
    pub profile: BlockLoadProfile,
}

impl ProfileRecord {
    /// Create a record.
    #[must_use]
    pub const fn new(meter_ip: String, profile: BlockLoadProfile) -> Self {
        Self { meter_ip, profile }
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Default retry count forwarded to the processor.
pub const DEFAULT_RETRIES: u32 = 3;

/// Default meter connection timeout forwarded to the processor.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Default delay between processor-side retries.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Call parameters interpreted by the remote processor.
///
/// The client never acts on these; they travel inside the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestParams {
    /// Number of meter connection retries.
    pub retries: u32,
    /// Meter connection timeout (whole seconds on the wire).
    pub connection_timeout: Duration,
    /// Delay between retries (whole seconds on the wire).
    pub retry_delay: Duration,
}

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// A block load profile request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRequest {
    /// Meters to read.
    pub meters: Vec<MeterConfig>,
    /// Processor call parameters.
    pub params: RequestParams,
}

impl ProfileRequest {
    /// Create a request for a set of meters.
    #[must_use]
    pub const fn new(meters: Vec<MeterConfig>, params: RequestParams) -> Self {
        Self { meters, params }
    }

    /// Create a request for a single meter.
    #[must_use]
    pub fn for_meter(meter: MeterConfig, params: RequestParams) -> Self {
        Self::new(vec![meter], params)
    }
}

// =============================================================================
// Tests
// =============================================================================
