//! Block Load Streaming Integration Tests
//!
//! Runs the trigger and gRPC client against a scripted in-process
//! `DLMSProcessor` server on an ephemeral port.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::stream::{self, BoxStream};
use parking_lot::Mutex;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tonic::{Request, Response, Status};

use block_load_client::{
    GrpcProfileClient, MeterConfig, MeterConfigHolder, ProcessorSettings, ProfileRequestTrigger,
    ProfileStore, StreamOutcome, StreamPhase,
    proto::{
        BlockLoadProfile, GetBlockLoadProfileRequest, GetBlockLoadProfileResponse,
        dlms_processor_server::{DlmsProcessor, DlmsProcessorServer},
    },
};

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// Fake Processor
// =============================================================================

/// One scripted reply: the items to stream, and whether to keep the stream
/// open afterwards.
struct Reply {
    items: Vec<Result<GetBlockLoadProfileResponse, Status>>,
    hold_open: bool,
}

impl Reply {
    fn finished(items: Vec<Result<GetBlockLoadProfileResponse, Status>>) -> Self {
        Self {
            items,
            hold_open: false,
        }
    }

    fn held_open(items: Vec<Result<GetBlockLoadProfileResponse, Status>>) -> Self {
        Self {
            items,
            hold_open: true,
        }
    }
}

#[derive(Clone, Default)]
struct FakeProcessor {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    requests: Arc<Mutex<Vec<GetBlockLoadProfileRequest>>>,
}

impl FakeProcessor {
    fn with_replies(replies: Vec<Reply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            requests: Arc::default(),
        }
    }

    fn requests(&self) -> Vec<GetBlockLoadProfileRequest> {
        self.requests.lock().clone()
    }
}

#[tonic::async_trait]
impl DlmsProcessor for FakeProcessor {
    type GetBlockLoadProfileStream =
        BoxStream<'static, Result<GetBlockLoadProfileResponse, Status>>;

    async fn get_block_load_profile(
        &self,
        request: Request<GetBlockLoadProfileRequest>,
    ) -> Result<Response<Self::GetBlockLoadProfileStream>, Status> {
        self.requests.lock().push(request.into_inner());

        let Some(reply) = self.replies.lock().pop_front() else {
            return Err(Status::resource_exhausted("no scripted reply"));
        };

        let items = stream::iter(reply.items);
        let stream = if reply.hold_open {
            items.chain(stream::pending()).boxed()
        } else {
            items.boxed()
        };
        Ok(Response::new(stream))
    }
}

async fn spawn_processor(processor: FakeProcessor) -> (String, CancellationToken) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    let token = shutdown.clone();

    tokio::spawn(async move {
        Server::builder()
            .add_service(DlmsProcessorServer::new(processor))
            .serve_with_incoming_shutdown(
                tokio_stream::wrappers::TcpListenerStream::new(listener),
                async move { token.cancelled().await },
            )
            .await
            .unwrap();
    });

    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://{addr}"), shutdown)
}

fn response(date_time: &str) -> GetBlockLoadProfileResponse {
    GetBlockLoadProfileResponse {
        meter_ip: MeterConfig::default().ip,
        profile: Some(BlockLoadProfile {
            date_time: date_time.to_string(),
            average_voltage: 229.8,
            block_energy_wh_import: 41.0,
            block_energy_vah_import: 43.5,
            block_energy_wh_export: 0.0,
            block_energy_vah_export: 0.0,
            average_current: 0.7,
            meter_health_indicator: 0,
        }),
    }
}

fn trigger_for(endpoint: &str, store: &ProfileStore) -> ProfileRequestTrigger {
    let client = GrpcProfileClient::new(ProcessorSettings {
        endpoint: endpoint.to_string(),
        connect_timeout: Duration::from_secs(2),
    });
    ProfileRequestTrigger::new(Arc::new(client), MeterConfigHolder::default(), store.clone())
}

fn stamps(store: &ProfileStore) -> Vec<String> {
    store
        .get()
        .iter()
        .map(|r| r.profile.date_time.clone())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn default_config_streams_records_in_order() {
    let processor = FakeProcessor::with_replies(vec![Reply::finished(vec![
        Ok(response("2024-05-01 00:15:00")),
        Ok(response("2024-05-01 00:30:00")),
        Ok(response("2024-05-01 00:45:00")),
    ])]);
    let (endpoint, shutdown) = spawn_processor(processor.clone()).await;

    let store = ProfileStore::new();
    let trigger = trigger_for(&endpoint, &store);

    let outcome = timeout(TEST_TIMEOUT, trigger.start().outcome())
        .await
        .unwrap();

    assert_eq!(outcome, StreamOutcome::Completed { records: 3 });
    assert_eq!(
        stamps(&store),
        vec![
            "2024-05-01 00:15:00",
            "2024-05-01 00:30:00",
            "2024-05-01 00:45:00"
        ]
    );
    assert!(
        store
            .get()
            .iter()
            .all(|r| r.meter_ip == MeterConfig::default().ip)
    );

    let requests = processor.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.meter.len(), 1);
    assert_eq!(request.meter[0].ip, "2401:4900:833f:2688:0000:0000:0000:0002");
    assert_eq!(request.meter[0].port, 4059);
    assert_eq!(request.meter[0].obis, "1.0.1.8.0.255");
    assert_eq!(request.retries, 3);
    assert_eq!(request.connection_timeout, 60);
    assert_eq!(request.retry_delay, 5);

    shutdown.cancel();
}

#[tokio::test]
async fn observers_see_each_record_as_it_arrives() {
    let processor = FakeProcessor::with_replies(vec![Reply::finished(vec![
        Ok(response("t1")),
        Ok(response("t2")),
    ])]);
    let (endpoint, shutdown) = spawn_processor(processor).await;

    let store = ProfileStore::new();
    store.append(block_load_client::ProfileRecord::new(
        "stale".to_string(),
        block_load_client::BlockLoadProfile::default(),
    ));
    let lengths = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lengths);
    let _subscription = store.subscribe(move |snapshot| sink.lock().push(snapshot.len()));

    let trigger = trigger_for(&endpoint, &store);
    timeout(TEST_TIMEOUT, trigger.start().outcome())
        .await
        .unwrap();

    assert_eq!(*lengths.lock(), vec![1, 0, 1, 2]);
    shutdown.cancel();
}

#[tokio::test]
async fn stream_error_after_partial_data_keeps_records() {
    let processor = FakeProcessor::with_replies(vec![Reply::finished(vec![
        Ok(response("A")),
        Ok(response("B")),
        Err(Status::unavailable("meter dropped the association")),
    ])]);
    let (endpoint, shutdown) = spawn_processor(processor).await;

    let store = ProfileStore::new();
    let trigger = trigger_for(&endpoint, &store);

    let outcome = timeout(TEST_TIMEOUT, trigger.start().outcome())
        .await
        .unwrap();

    assert_eq!(stamps(&store), vec!["A", "B"]);
    assert_eq!(outcome.records(), 2);
    let error = outcome.error().unwrap();
    assert_eq!(error.kind(), "stream");
    assert!(error.to_string().contains("meter dropped the association"));
    assert!(matches!(
        trigger.phase().as_ref(),
        StreamPhase::Finished {
            outcome: StreamOutcome::Failed { .. },
            ..
        }
    ));

    shutdown.cancel();
}

#[tokio::test]
async fn rejected_call_is_transport_error() {
    let processor = FakeProcessor::with_replies(Vec::new());
    let (endpoint, shutdown) = spawn_processor(processor).await;

    let store = ProfileStore::new();
    let trigger = trigger_for(&endpoint, &store);

    let outcome = timeout(TEST_TIMEOUT, trigger.start().outcome())
        .await
        .unwrap();

    assert!(store.is_empty());
    assert_eq!(outcome.error().map(|e| e.kind()), Some("transport"));
    shutdown.cancel();
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    drop(listener);

    let store = ProfileStore::new();
    let trigger = trigger_for(&format!("http://{addr}"), &store);

    let outcome = timeout(TEST_TIMEOUT, trigger.start().outcome())
        .await
        .unwrap();

    assert_eq!(outcome.records(), 0);
    assert_eq!(outcome.error().map(|e| e.kind()), Some("transport"));
}

#[tokio::test]
async fn retrigger_supersedes_open_stream() {
    let processor = FakeProcessor::with_replies(vec![
        Reply::held_open(vec![Ok(response("first-1"))]),
        Reply::finished(vec![Ok(response("second-1")), Ok(response("second-2"))]),
    ]);
    let (endpoint, shutdown) = spawn_processor(processor.clone()).await;

    let store = ProfileStore::new();
    let trigger = trigger_for(&endpoint, &store);

    let first = trigger.start();
    let mut changes = store.changes();
    timeout(TEST_TIMEOUT, async {
        while let Some(snapshot) = changes.next().await {
            if snapshot.len() == 1 {
                break;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(stamps(&store), vec!["first-1"]);

    let second = trigger.start();
    let second_outcome = timeout(TEST_TIMEOUT, second.outcome()).await.unwrap();
    let first_outcome = timeout(TEST_TIMEOUT, first.outcome()).await.unwrap();

    assert_eq!(first_outcome, StreamOutcome::Cancelled { records: 1 });
    assert_eq!(second_outcome, StreamOutcome::Completed { records: 2 });
    assert_eq!(stamps(&store), vec!["second-1", "second-2"]);
    assert_eq!(processor.requests().len(), 2);

    shutdown.cancel();
}

#[tokio::test]
async fn config_change_is_used_by_next_request() {
    let processor = FakeProcessor::with_replies(vec![Reply::finished(vec![Ok(response("t1"))])]);
    let (endpoint, shutdown) = spawn_processor(processor.clone()).await;

    let store = ProfileStore::new();
    let trigger = trigger_for(&endpoint, &store);
    trigger.config().set(MeterConfig {
        ip: "192.168.10.20".to_string(),
        port: 4060,
        ..MeterConfig::default()
    });

    timeout(TEST_TIMEOUT, trigger.start().outcome())
        .await
        .unwrap();

    let requests = processor.requests();
    assert_eq!(requests[0].meter[0].ip, "192.168.10.20");
    assert_eq!(requests[0].meter[0].port, 4060);
    shutdown.cancel();
}
