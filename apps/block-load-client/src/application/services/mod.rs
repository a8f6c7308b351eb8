//! Application Services
//!
//! `ProfileRequestTrigger` turns the current meter configuration into a
//! block load profile request, clears the result store, opens the stream
//! and appends every record it yields.
//!
//! # Phases
//!
//! ```text
//! Idle ──start()──► Streaming ──complete / error / cancel──► Finished
//!                       ▲                                        │
//!                       └────────────────start()─────────────────┘
//! ```
//!
//! # Overlapping requests
//!
//! Starting a request while another is streaming supersedes it: the old
//! stream is cancelled and the store moves to a new epoch, so any record the
//! old stream still delivers is refused. Results never mix two requests.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::application::ports::{ClientError, ProfileStreamPort};
use crate::domain::meter::MeterConfigHolder;
use crate::domain::profile::{ProfileRequest, RequestParams};
use crate::domain::store::{Atom, Changes, ProfileStore, StoreEpoch, Subscription};
use crate::infrastructure::metrics;

// =============================================================================
// Phase and Outcome
// =============================================================================

/// How a stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The processor ended the stream normally.
    Completed {
        /// Records appended by this request.
        records: usize,
    },
    /// The stream could not be opened or ended with an error. Records
    /// already appended stay in the store.
    Failed {
        /// Records appended before the error.
        records: usize,
        /// Terminal error.
        error: ClientError,
    },
    /// The request was cancelled or superseded by a newer one.
    Cancelled {
        /// Records appended before cancellation.
        records: usize,
    },
}

impl StreamOutcome {
    /// Records appended by the request.
    #[must_use]
    pub const fn records(&self) -> usize {
        match self {
            Self::Completed { records }
            | Self::Failed { records, .. }
            | Self::Cancelled { records } => *records,
        }
    }

    /// Terminal error, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&ClientError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Whether the stream completed normally.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Observable request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StreamPhase {
    /// No request has been made yet.
    #[default]
    Idle,
    /// A stream is open and records are being appended.
    Streaming {
        /// Request identifier.
        request_id: Uuid,
        /// When the request started.
        started_at: DateTime<Utc>,
    },
    /// The latest request has ended.
    Finished {
        /// Request identifier.
        request_id: Uuid,
        /// How it ended.
        outcome: StreamOutcome,
    },
}

impl StreamPhase {
    /// Whether a stream is in flight.
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming { .. })
    }

    /// Identifier of the latest request, if any.
    #[must_use]
    pub const fn request_id(&self) -> Option<Uuid> {
        match self {
            Self::Idle => None,
            Self::Streaming { request_id, .. } | Self::Finished { request_id, .. } => {
                Some(*request_id)
            }
        }
    }
}

// =============================================================================
// Request Handle
// =============================================================================

/// Handle to one started request.
#[derive(Debug)]
pub struct RequestHandle {
    request_id: Uuid,
    cancel: CancellationToken,
    task: JoinHandle<StreamOutcome>,
}

impl RequestHandle {
    /// Request identifier.
    #[must_use]
    pub const fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Cancel the stream. Records already appended stay in the store.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the stream task has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the stream to end.
    pub async fn outcome(self) -> StreamOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => StreamOutcome::Failed {
                records: 0,
                error: ClientError::Stream {
                    message: format!("stream task ended abnormally: {e}"),
                },
            },
        }
    }
}

// =============================================================================
// Trigger
// =============================================================================

struct ActiveRequest {
    request_id: Uuid,
    cancel: CancellationToken,
}

/// Starts block load profile requests and wires their records into the
/// result store.
pub struct ProfileRequestTrigger {
    port: Arc<dyn ProfileStreamPort>,
    config: MeterConfigHolder,
    store: ProfileStore,
    params: RequestParams,
    phase: Atom<StreamPhase>,
    active: Mutex<Option<ActiveRequest>>,
}

impl std::fmt::Debug for ProfileRequestTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileRequestTrigger")
            .field("params", &self.params)
            .field("phase", &self.phase.get())
            .field("records", &self.store.len())
            .finish_non_exhaustive()
    }
}

impl ProfileRequestTrigger {
    /// Create a trigger with the default request parameters.
    #[must_use]
    pub fn new(
        port: Arc<dyn ProfileStreamPort>,
        config: MeterConfigHolder,
        store: ProfileStore,
    ) -> Self {
        Self {
            port,
            config,
            store,
            params: RequestParams::default(),
            phase: Atom::default(),
            active: Mutex::new(None),
        }
    }

    /// Override the request parameters.
    #[must_use]
    pub const fn with_params(mut self, params: RequestParams) -> Self {
        self.params = params;
        self
    }

    /// Request parameters in use.
    #[must_use]
    pub const fn params(&self) -> RequestParams {
        self.params
    }

    /// The result store this trigger writes into.
    #[must_use]
    pub const fn store(&self) -> &ProfileStore {
        &self.store
    }

    /// The configuration holder requests are built from.
    #[must_use]
    pub const fn config(&self) -> &MeterConfigHolder {
        &self.config
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Arc<StreamPhase> {
        self.phase.get()
    }

    /// Observe the phase, starting with the current value.
    pub fn subscribe_phase<F>(&self, listener: F) -> Subscription<StreamPhase>
    where
        F: Fn(&Arc<StreamPhase>) + Send + Sync + 'static,
    {
        self.phase.subscribe(listener)
    }

    /// Async stream of phase changes.
    #[must_use]
    pub fn phase_changes(&self) -> Changes<StreamPhase> {
        self.phase.changes()
    }

    /// Build a request from the current configuration.
    #[must_use]
    pub fn build_request(&self) -> ProfileRequest {
        ProfileRequest::for_meter(self.config.get(), self.params)
    }

    /// Start a request.
    ///
    /// Clears the store, then opens the stream on a spawned task and returns
    /// without waiting. Any stream still in flight is superseded. Must be
    /// called from within a tokio runtime.
    ///
    /// No trigger lock is held while store or phase listeners run, so they
    /// may call [`ProfileRequestTrigger::cancel`] or start another request.
    pub fn start(&self) -> RequestHandle {
        let request_id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let request = self.build_request();

        // The newest epoch always belongs to the newest active request.
        let epoch = self.store.reset_with(|_| {
            let previous = self.active.lock().replace(ActiveRequest {
                request_id,
                cancel: cancel.clone(),
            });
            if let Some(previous) = previous
                && !previous.cancel.is_cancelled()
            {
                tracing::info!(
                    superseded = %previous.request_id,
                    %request_id,
                    "Superseding in-flight block load profile stream"
                );
                previous.cancel.cancel();
                metrics::record_stream_superseded();
            }
        });

        // A listener may already have started a newer request.
        self.phase.try_update(|_| {
            self.is_active(request_id).then(|| StreamPhase::Streaming {
                request_id,
                started_at: Utc::now(),
            })
        });

        let driver = StreamDriver {
            port: Arc::clone(&self.port),
            store: self.store.clone(),
            phase: self.phase.clone(),
            request_id,
            epoch,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(driver.run(request));

        RequestHandle {
            request_id,
            cancel,
            task,
        }
    }

    /// Cancel the in-flight stream, if any.
    pub fn cancel(&self) {
        if let Some(active) = self.active.lock().as_ref() {
            active.cancel.cancel();
        }
    }

    fn is_active(&self, request_id: Uuid) -> bool {
        self.active
            .lock()
            .as_ref()
            .is_some_and(|active| active.request_id == request_id)
    }
}

// =============================================================================
// Stream Driver
// =============================================================================

struct StreamDriver {
    port: Arc<dyn ProfileStreamPort>,
    store: ProfileStore,
    phase: Atom<StreamPhase>,
    request_id: Uuid,
    epoch: StoreEpoch,
    cancel: CancellationToken,
}

impl StreamDriver {
    async fn run(self, request: ProfileRequest) -> StreamOutcome {
        let started = Instant::now();
        metrics::record_request_started();
        tracing::info!(
            request_id = %self.request_id,
            meters = request.meters.len(),
            retries = request.params.retries,
            "Opening block load profile stream"
        );

        let outcome = self.consume(request).await;

        match &outcome {
            StreamOutcome::Completed { records } => {
                tracing::info!(request_id = %self.request_id, records, "Block load profile stream completed");
            }
            StreamOutcome::Cancelled { records } => {
                tracing::info!(request_id = %self.request_id, records, "Block load profile stream cancelled");
            }
            StreamOutcome::Failed { records, error } => {
                tracing::error!(
                    request_id = %self.request_id,
                    records,
                    kind = error.kind(),
                    error = %error,
                    "Block load profile stream failed"
                );
            }
        }
        metrics::record_stream_finished(&outcome, started.elapsed());

        // A superseding request owns the phase from here on.
        self.phase.try_update(|phase| match phase {
            StreamPhase::Streaming { request_id, .. } if *request_id == self.request_id => {
                Some(StreamPhase::Finished {
                    request_id: self.request_id,
                    outcome: outcome.clone(),
                })
            }
            _ => None,
        });

        outcome
    }

    async fn consume(&self, request: ProfileRequest) -> StreamOutcome {
        let mut records = 0;

        let opened = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return StreamOutcome::Cancelled { records },
            opened = self.port.open(request) => opened,
        };
        let mut stream = match opened {
            Ok(stream) => stream,
            Err(error) => return StreamOutcome::Failed { records, error },
        };

        loop {
            let next = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return StreamOutcome::Cancelled { records },
                next = stream.next() => next,
            };

            match next {
                Some(Ok(record)) => {
                    let meter_ip = record.meter_ip.clone();
                    if !self.store.append_for(self.epoch, record) {
                        return StreamOutcome::Cancelled { records };
                    }
                    records += 1;
                    metrics::record_record_received();
                    tracing::debug!(request_id = %self.request_id, %meter_ip, records, "Block load profile record appended");
                }
                Some(Err(error)) => return StreamOutcome::Failed { records, error },
                None => return StreamOutcome::Completed { records },
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
