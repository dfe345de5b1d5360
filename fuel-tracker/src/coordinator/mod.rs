//! Polling coordinators.
//!
//! One coordinator per tracked station fetches it on a fixed interval and
//! keeps the last good snapshot available to readers. The registry groups
//! coordinators by city and owns their lifetimes.

mod feed;
mod polling;
mod registry;
mod source;

#[cfg(test)]
mod mock;

pub use feed::{
    CoordinatorStatus, ErrorKind, RefreshError, RefreshEvent, RefreshFailure, RefreshOutcome,
    StationFeed,
};
pub use polling::{
    CoordinatorConfig, DEFAULT_UPDATE_INTERVAL, MAX_UPDATE_INTERVAL, MIN_UPDATE_INTERVAL,
    PollingCoordinator,
};
pub use registry::{CityFeeds, CityKey, CoordinatorRegistry, RegistryError, TrackedCity};
pub use source::StationSource;
