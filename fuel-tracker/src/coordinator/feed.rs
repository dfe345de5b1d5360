//! Latest-known state of one tracked station.
//!
//! A `StationFeed` is what consumers hold: the last good snapshot, when it
//! was fetched, and how the most recent refresh went. Only the feed's own
//! refresh path writes to it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, Semaphore, broadcast};
use tracing::{debug, warn};

use crate::dgeg::DgegError;
use crate::domain::{Station, StationId};

use super::source::StationSource;

/// Capacity of each feed's event channel.
const EVENT_CAPACITY: usize = 16;

/// Why a refresh failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure, non-200 status or non-JSON response
    Upstream,
    /// Response was JSON but not a valid station
    MalformedData,
    /// Response parsed but had neither a name nor fuels
    EmptyResult,
}

/// Error from fetching one station snapshot.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    /// The DGEG client failed
    #[error(transparent)]
    Fetch(#[from] DgegError),

    /// The station came back without a name or any fuels
    #[error("station {0} returned no data")]
    Empty(StationId),
}

impl RefreshError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RefreshError::Fetch(e) if e.is_upstream() => ErrorKind::Upstream,
            RefreshError::Fetch(_) => ErrorKind::MalformedData,
            RefreshError::Empty(_) => ErrorKind::EmptyResult,
        }
    }
}

/// Record of the most recent failed refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshFailure {
    pub kind: ErrorKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Lifecycle of a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinatorStatus {
    /// No refresh has completed yet
    #[default]
    Uninitialized,
    /// The last refresh succeeded
    Ready,
    /// The last refresh failed; older data may still be available
    Failed,
}

/// Result of asking a feed to refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Updated,
    Failed(ErrorKind),
    /// Another fetch for this station was still in flight
    Skipped,
}

/// Published to subscribers after every completed refresh.
#[derive(Debug, Clone)]
pub enum RefreshEvent {
    Updated {
        station_id: StationId,
        station: Arc<Station>,
    },
    Failed {
        station_id: StationId,
        failure: RefreshFailure,
    },
}

#[derive(Debug, Default)]
struct FeedState {
    status: CoordinatorStatus,
    data: Option<Arc<Station>>,
    last_fetch_at: Option<DateTime<Utc>>,
    last_failure: Option<RefreshFailure>,
}

struct FeedInner<S> {
    station_id: StationId,
    source: Arc<S>,
    state: RwLock<FeedState>,
    /// Single permit: held for the duration of a fetch.
    in_flight: Semaphore,
    events: broadcast::Sender<RefreshEvent>,
}

/// Shared, cheaply cloneable view of one station's latest data.
pub struct StationFeed<S> {
    inner: Arc<FeedInner<S>>,
}

impl<S> Clone for StationFeed<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: StationSource> StationFeed<S> {
    /// Create a feed with no data yet.
    pub fn new(station_id: StationId, source: Arc<S>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(FeedInner {
                station_id,
                source,
                state: RwLock::new(FeedState::default()),
                in_flight: Semaphore::new(1),
                events,
            }),
        }
    }

    pub fn station_id(&self) -> &StationId {
        &self.inner.station_id
    }

    /// The last successfully fetched station, if any.
    pub async fn current_data(&self) -> Option<Arc<Station>> {
        self.inner.state.read().await.data.clone()
    }

    /// When the last successful fetch completed.
    pub async fn last_fetch_at(&self) -> Option<DateTime<Utc>> {
        self.inner.state.read().await.last_fetch_at
    }

    /// Kind of the most recent failure, cleared by the next success.
    pub async fn last_error(&self) -> Option<ErrorKind> {
        self.inner
            .state
            .read()
            .await
            .last_failure
            .as_ref()
            .map(|f| f.kind)
    }

    pub async fn last_failure(&self) -> Option<RefreshFailure> {
        self.inner.state.read().await.last_failure.clone()
    }

    pub async fn status(&self) -> CoordinatorStatus {
        self.inner.state.read().await.status
    }

    /// Receive an event after every completed refresh.
    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.inner.events.subscribe()
    }

    /// Refresh now, unless a fetch for this station is already running.
    ///
    /// Failures are recorded and reported, never returned as errors; the
    /// previous snapshot stays in place.
    pub async fn refresh(&self) -> RefreshOutcome {
        let Ok(_permit) = self.inner.in_flight.try_acquire() else {
            debug!(station = %self.inner.station_id, "fetch already in flight, skipping");
            return RefreshOutcome::Skipped;
        };

        match self.fetch_and_record().await {
            Ok(_) => RefreshOutcome::Updated,
            Err(e) => RefreshOutcome::Failed(e.kind()),
        }
    }

    /// Fetch once and record the result.
    ///
    /// Callers other than `refresh` must guarantee no other fetch can run.
    pub(crate) async fn fetch_and_record(&self) -> Result<Arc<Station>, RefreshError> {
        let id = &self.inner.station_id;

        let result = match self.inner.source.fetch_station(id).await {
            Ok(station) if station.is_empty() => Err(RefreshError::Empty(id.clone())),
            Ok(station) => Ok(Arc::new(station)),
            Err(e) => Err(RefreshError::from(e)),
        };

        match &result {
            Ok(station) => self.record_success(station.clone()).await,
            Err(e) => self.record_failure(e).await,
        }

        result
    }

    async fn record_success(&self, station: Arc<Station>) {
        let now = Utc::now();
        {
            let mut state = self.inner.state.write().await;
            state.data = Some(station.clone());
            state.last_fetch_at = Some(now);
            state.last_failure = None;
            state.status = CoordinatorStatus::Ready;
        }

        debug!(
            station = %self.inner.station_id,
            fuels = station.fuels.len(),
            "fetched station data"
        );

        // no subscribers is fine
        let _ = self.inner.events.send(RefreshEvent::Updated {
            station_id: self.inner.station_id.clone(),
            station,
        });
    }

    async fn record_failure(&self, error: &RefreshError) {
        let failure = RefreshFailure {
            kind: error.kind(),
            message: error.to_string(),
            at: Utc::now(),
        };
        {
            let mut state = self.inner.state.write().await;
            state.last_failure = Some(failure.clone());
            state.status = CoordinatorStatus::Failed;
        }

        warn!(
            station = %self.inner.station_id,
            kind = ?failure.kind,
            error = %error,
            "station refresh failed"
        );

        let _ = self.inner.events.send(RefreshEvent::Failed {
            station_id: self.inner.station_id.clone(),
            failure,
        });
    }
}
