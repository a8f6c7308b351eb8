//! DLMS processor gRPC client.
//!
//! Opens one server-streaming `GetBlockLoadProfile` call per request and
//! yields domain records as they are decoded. The client never retries and
//! never touches the result store.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};

use super::proto::dlmsprocessor::{
    BlockLoadProfile as ProtoProfile, GetBlockLoadProfileRequest, GetBlockLoadProfileResponse,
    Meter, dlms_processor_client::DlmsProcessorClient,
};
use crate::application::ports::{ClientError, ProfileStream, ProfileStreamPort};
use crate::domain::meter::MeterConfig;
use crate::domain::profile::{BlockLoadProfile, ProfileRecord, ProfileRequest};
use crate::infrastructure::config::ProcessorSettings;

/// gRPC adapter for the DLMS processor.
#[derive(Debug, Clone)]
pub struct GrpcProfileClient {
    settings: ProcessorSettings,
}

impl GrpcProfileClient {
    /// Create a client for the configured processor endpoint.
    ///
    /// No connection is made until a stream is opened.
    #[must_use]
    pub const fn new(settings: ProcessorSettings) -> Self {
        Self { settings }
    }

    /// Processor endpoint URI.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.settings.endpoint
    }

    fn create_endpoint(&self) -> Result<Endpoint, ClientError> {
        let mut endpoint = Channel::from_shared(self.settings.endpoint.clone())
            .map_err(|e| ClientError::Configuration {
                message: format!("invalid endpoint {}: {e}", self.settings.endpoint),
            })?
            .connect_timeout(self.settings.connect_timeout)
            .tcp_nodelay(true);

        if endpoint.uri().scheme_str() == Some("https") {
            endpoint = endpoint
                .tls_config(ClientTlsConfig::new().with_native_roots())
                .map_err(|e| ClientError::Configuration {
                    message: format!("invalid TLS configuration: {e}"),
                })?;
        }

        Ok(endpoint)
    }
}

#[async_trait]
impl ProfileStreamPort for GrpcProfileClient {
    async fn open(&self, request: ProfileRequest) -> Result<ProfileStream, ClientError> {
        let endpoint = self.create_endpoint()?;
        let channel = endpoint
            .connect()
            .await
            .map_err(|e| ClientError::Transport {
                message: format!("failed to connect to {}: {e}", self.settings.endpoint),
            })?;
        let mut client = DlmsProcessorClient::new(channel);

        tracing::debug!(
            endpoint = %self.settings.endpoint,
            meters = request.meters.len(),
            "Requesting block load profile"
        );

        let response = client
            .get_block_load_profile(GetBlockLoadProfileRequest::from(&request))
            .await
            .map_err(|status| ClientError::Transport {
                message: status_message(&status),
            })?;

        let stream = response.into_inner().map(|item| {
            item.map(ProfileRecord::from)
                .map_err(|status| ClientError::Stream {
                    message: status_message(&status),
                })
        });

        Ok(stream.boxed())
    }
}

fn status_message(status: &tonic::Status) -> String {
    format!("{:?}: {}", status.code(), status.message())
}

// =============================================================================
// Wire Conversions
// =============================================================================

impl From<&MeterConfig> for Meter {
    fn from(config: &MeterConfig) -> Self {
        Self {
            ip: config.ip.clone(),
            port: i32::from(config.port),
            auth_password: config.auth_password.clone(),
            system_title: config.system_title.clone(),
            block_cipher_key: config.block_cipher_key.clone(),
            auth_key: config.auth_key.clone(),
            client_address: config.client_address.clone(),
            server_address: config.server_address.clone(),
            obis: config.obis.clone(),
        }
    }
}

impl From<&ProfileRequest> for GetBlockLoadProfileRequest {
    fn from(request: &ProfileRequest) -> Self {
        Self {
            meter: request.meters.iter().map(Meter::from).collect(),
            retries: saturating_i32(u64::from(request.params.retries)),
            connection_timeout: whole_seconds(request.params.connection_timeout),
            retry_delay: whole_seconds(request.params.retry_delay),
        }
    }
}

impl From<ProtoProfile> for BlockLoadProfile {
    fn from(profile: ProtoProfile) -> Self {
        Self {
            date_time: profile.date_time,
            average_voltage: profile.average_voltage,
            block_energy_wh_import: profile.block_energy_wh_import,
            block_energy_vah_import: profile.block_energy_vah_import,
            block_energy_wh_export: profile.block_energy_wh_export,
            block_energy_vah_export: profile.block_energy_vah_export,
            average_current: profile.average_current,
            meter_health_indicator: u8::try_from(profile.meter_health_indicator)
                .unwrap_or(u8::MAX),
        }
    }
}

impl From<GetBlockLoadProfileResponse> for ProfileRecord {
    fn from(response: GetBlockLoadProfileResponse) -> Self {
        let profile = response.profile.map_or_else(
            || {
                tracing::warn!(meter_ip = %response.meter_ip, "Response carried no profile");
                BlockLoadProfile::default()
            },
            BlockLoadProfile::from,
        );
        Self::new(response.meter_ip, profile)
    }
}

fn whole_seconds(duration: Duration) -> i32 {
    saturating_i32(duration.as_secs())
}

fn saturating_i32(value: u64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::profile::RequestParams;

    #[test]
    fn request_conversion_carries_meter_and_params() {
        let meter = MeterConfig::default();
        let request = ProfileRequest::for_meter(meter.clone(), RequestParams::default());

        let wire = GetBlockLoadProfileRequest::from(&request);

        assert_eq!(wire.meter.len(), 1);
        assert_eq!(wire.meter[0].ip, meter.ip);
        assert_eq!(wire.meter[0].port, 4059);
        assert_eq!(wire.meter[0].auth_password, meter.auth_password);
        assert_eq!(wire.meter[0].client_address, "48");
        assert_eq!(wire.meter[0].server_address, "1");
        assert_eq!(wire.meter[0].obis, "1.0.1.8.0.255");
        assert_eq!(wire.retries, 3);
        assert_eq!(wire.connection_timeout, 60);
        assert_eq!(wire.retry_delay, 5);
    }

    #[test]
    fn empty_meter_list_is_forwarded() {
        let request = ProfileRequest::new(Vec::new(), RequestParams::default());
        let wire = GetBlockLoadProfileRequest::from(&request);
        assert!(wire.meter.is_empty());
    }

    #[test_case(u32::MAX, i32::MAX ; "retries saturate")]
    #[test_case(0, 0 ; "zero retries")]
    #[test_case(7, 7 ; "small retries")]
    fn retries_fit_wire_type(retries: u32, expected: i32) {
        let params = RequestParams {
            retries,
            ..RequestParams::default()
        };
        let wire = GetBlockLoadProfileRequest::from(&ProfileRequest::new(Vec::new(), params));
        assert_eq!(wire.retries, expected);
    }

    #[test]
    fn sub_second_durations_truncate() {
        let params = RequestParams {
            retries: 1,
            connection_timeout: Duration::from_millis(1_500),
            retry_delay: Duration::from_millis(999),
        };
        let wire = GetBlockLoadProfileRequest::from(&ProfileRequest::new(Vec::new(), params));
        assert_eq!(wire.connection_timeout, 1);
        assert_eq!(wire.retry_delay, 0);
    }

    #[test]
    fn response_conversion_copies_profile() {
        let response = GetBlockLoadProfileResponse {
            meter_ip: "10.0.0.1".to_string(),
            profile: Some(ProtoProfile {
                date_time: "2024-01-01 00:15:00".to_string(),
                average_voltage: 231.4,
                block_energy_wh_import: 12.5,
                block_energy_vah_import: 13.0,
                block_energy_wh_export: 0.5,
                block_energy_vah_export: 0.6,
                average_current: 1.25,
                meter_health_indicator: 1,
            }),
        };

        let record = ProfileRecord::from(response);

        assert_eq!(record.meter_ip, "10.0.0.1");
        assert_eq!(record.profile.date_time, "2024-01-01 00:15:00");
        assert_eq!(record.profile.average_voltage, 231.4);
        assert_eq!(record.profile.block_energy_vah_export, 0.6);
        assert_eq!(record.profile.meter_health_indicator, 1);
    }

    #[test]
    fn missing_profile_maps_to_default() {
        let response = GetBlockLoadProfileResponse {
            meter_ip: "10.0.0.1".to_string(),
            profile: None,
        };
        let record = ProfileRecord::from(response);
        assert_eq!(record.profile, BlockLoadProfile::default());
    }

    #[test]
    fn oversized_health_indicator_saturates() {
        let profile = ProtoProfile {
            meter_health_indicator: 300,
            ..ProtoProfile::default()
        };
        assert_eq!(BlockLoadProfile::from(profile).meter_health_indicator, u8::MAX);
    }

    #[tokio::test]
    async fn malformed_endpoint_is_configuration_error() {
        let client = GrpcProfileClient::new(ProcessorSettings::new("not a uri"));
        let err = match client.open(ProfileRequest::new(Vec::new(), RequestParams::default())).await {
            Ok(_) => panic!("expected an error"),
            Err(err) => err,
        };
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn status_message_includes_code() {
        let status = tonic::Status::unavailable("meter offline");
        assert_eq!(status_message(&status), "Unavailable: meter offline");
    }
}
