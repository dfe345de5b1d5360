//! Per-station periodic refresh.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::domain::{Station, StationId};

use super::feed::{
    CoordinatorStatus, ErrorKind, RefreshError, RefreshEvent, RefreshFailure, RefreshOutcome,
    StationFeed,
};
use super::source::StationSource;

/// Default time between refreshes of one station.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Shortest time between refreshes.
pub const MIN_UPDATE_INTERVAL: Duration = Duration::from_secs(1);

/// Longest time between refreshes.
pub const MAX_UPDATE_INTERVAL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Configuration for polling coordinators.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Time between scheduled refreshes, clamped to
    /// `MIN_UPDATE_INTERVAL..=MAX_UPDATE_INTERVAL` when polling starts
    pub update_interval: Duration,
}

impl CoordinatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            update_interval: DEFAULT_UPDATE_INTERVAL,
        }
    }
}

/// Keeps one station's feed fresh.
///
/// Polling runs on a background task for as long as the coordinator lives.
/// Dropping it stops the schedule.
pub struct PollingCoordinator<S> {
    feed: StationFeed<S>,
    task: JoinHandle<()>,
}

impl<S: StationSource> PollingCoordinator<S> {
    /// Fetch the station once and, if that succeeds, start polling it.
    ///
    /// A failed first fetch is returned as an error and nothing keeps
    /// running.
    pub async fn start(
        station_id: StationId,
        source: Arc<S>,
        config: &CoordinatorConfig,
    ) -> Result<Self, RefreshError> {
        let feed = StationFeed::new(station_id, source);

        // nobody else can see the feed yet, so the in-flight guard is not needed
        feed.fetch_and_record().await?;

        let period = config
            .update_interval
            .clamp(MIN_UPDATE_INTERVAL, MAX_UPDATE_INTERVAL);
        let task = tokio::spawn(poll(feed.clone(), period));

        info!(
            station = %feed.station_id(),
            interval_secs = period.as_secs(),
            "started polling station"
        );

        Ok(Self { feed, task })
    }

    /// Stop polling. A fetch already in flight may still complete.
    pub fn stop(self) {
        drop(self);
    }

    pub fn feed(&self) -> &StationFeed<S> {
        &self.feed
    }

    pub fn station_id(&self) -> &StationId {
        self.feed.station_id()
    }

    pub async fn current_data(&self) -> Option<Arc<Station>> {
        self.feed.current_data().await
    }

    pub async fn last_fetch_at(&self) -> Option<DateTime<Utc>> {
        self.feed.last_fetch_at().await
    }

    pub async fn last_error(&self) -> Option<ErrorKind> {
        self.feed.last_error().await
    }

    pub async fn last_failure(&self) -> Option<RefreshFailure> {
        self.feed.last_failure().await
    }

    pub async fn status(&self) -> CoordinatorStatus {
        self.feed.status().await
    }

    /// Refresh outside the schedule.
    pub async fn refresh(&self) -> RefreshOutcome {
        self.feed.refresh().await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.feed.subscribe()
    }
}

impl<S> Drop for PollingCoordinator<S> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn poll<S: StationSource>(feed: StationFeed<S>, period: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        debug!(station = %feed.station_id(), "scheduled refresh");

        // run detached so a slow fetch never delays the next tick
        let feed = feed.clone();
        tokio::spawn(async move {
            feed.refresh().await;
        });
    }
}
