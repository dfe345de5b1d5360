//! Tracked cities and the coordinators serving them.
//!
//! A city is a `(district, locality)` pair with the stations the user chose
//! to follow there. Every station gets its own coordinator; the registry
//! owns them and drops them when the city is removed.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::try_join_all;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::StationId;

use super::feed::{RefreshError, StationFeed};
use super::polling::{CoordinatorConfig, PollingCoordinator};
use super::source::StationSource;

/// Identity of a tracked city.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CityKey {
    pub district_id: u8,
    pub locality: String,
}

impl CityKey {
    pub fn new(district_id: u8, locality: &str) -> Self {
        Self {
            district_id,
            locality: locality.trim().to_string(),
        }
    }
}

impl fmt::Display for CityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.district_id, self.locality)
    }
}

/// A city and the stations followed in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedCity {
    pub district_id: u8,
    pub locality: String,
    /// Unique, in the order they were chosen
    pub station_ids: Vec<StationId>,
}

impl TrackedCity {
    /// Build a city, dropping repeated station ids.
    pub fn new(district_id: u8, locality: &str, station_ids: Vec<StationId>) -> Self {
        let mut unique: Vec<StationId> = Vec::with_capacity(station_ids.len());
        for id in station_ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }

        Self {
            district_id,
            locality: locality.trim().to_string(),
            station_ids: unique,
        }
    }

    pub fn key(&self) -> CityKey {
        CityKey::new(self.district_id, &self.locality)
    }
}

/// Errors from registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("no stations selected")]
    NoStations,

    #[error("city {0} is already tracked")]
    AlreadyTracked(CityKey),

    #[error("city {0} is not tracked")]
    NotTracked(CityKey),

    /// One station could not be fetched, so the city was not added
    #[error("first refresh of station {station_id} failed: {source}")]
    FirstRefresh {
        station_id: StationId,
        #[source]
        source: RefreshError,
    },
}

/// Coordinators serving one city.
pub struct CityFeeds<S> {
    city: TrackedCity,
    coordinators: Vec<PollingCoordinator<S>>,
}

impl<S: StationSource> CityFeeds<S> {
    pub fn city(&self) -> &TrackedCity {
        &self.city
    }

    pub fn coordinators(&self) -> &[PollingCoordinator<S>] {
        &self.coordinators
    }

    pub fn feed(&self, id: &StationId) -> Option<StationFeed<S>> {
        self.coordinators
            .iter()
            .find(|c| c.station_id() == id)
            .map(|c| c.feed().clone())
    }
}

/// Owns the coordinators of every tracked city.
pub struct CoordinatorRegistry<S> {
    source: Arc<S>,
    config: CoordinatorConfig,
    cities: RwLock<HashMap<CityKey, CityFeeds<S>>>,
}

impl<S: StationSource> CoordinatorRegistry<S> {
    pub fn new(source: Arc<S>, config: CoordinatorConfig) -> Self {
        Self {
            source,
            config,
            cities: RwLock::new(HashMap::new()),
        }
    }

    /// Start tracking a city.
    ///
    /// Every station is fetched once before the city is added. If any of
    /// them fails, nothing is added and no coordinator keeps running.
    pub async fn add_city(&self, city: TrackedCity) -> Result<CityKey, RegistryError> {
        let city = TrackedCity::new(city.district_id, &city.locality, city.station_ids);
        let key = city.key();

        if city.station_ids.is_empty() {
            return Err(RegistryError::NoStations);
        }
        if self.cities.read().await.contains_key(&key) {
            return Err(RegistryError::AlreadyTracked(key));
        }

        // fetched outside the lock; successful ones are dropped on any failure
        let starts = city.station_ids.iter().cloned().map(|id| {
            let source = self.source.clone();
            let config = self.config.clone();
            async move {
                PollingCoordinator::start(id.clone(), source, &config)
                    .await
                    .map_err(|source| RegistryError::FirstRefresh {
                        station_id: id,
                        source,
                    })
            }
        });
        let coordinators = try_join_all(starts)
            .await
            .inspect_err(|e| warn!(city = %key, error = %e, "could not add city"))?;

        let mut cities = self.cities.write().await;
        if cities.contains_key(&key) {
            return Err(RegistryError::AlreadyTracked(key));
        }

        info!(city = %key, stations = coordinators.len(), "tracking city");
        cities.insert(key.clone(), CityFeeds { city, coordinators });

        Ok(key)
    }

    /// Stop tracking a city and all of its stations.
    pub async fn remove_city(&self, key: &CityKey) -> Result<TrackedCity, RegistryError> {
        let removed = self
            .cities
            .write()
            .await
            .remove(key)
            .ok_or_else(|| RegistryError::NotTracked(key.clone()))?;

        info!(city = %key, "stopped tracking city");
        Ok(removed.city)
    }

    /// Restart a city's coordinators with a new set of stations.
    ///
    /// Pass the current ids to refetch the same stations. On failure the
    /// city stays removed.
    pub async fn reload_city(
        &self,
        key: &CityKey,
        station_ids: Vec<StationId>,
    ) -> Result<CityKey, RegistryError> {
        if station_ids.is_empty() {
            return Err(RegistryError::NoStations);
        }
        let removed = self.remove_city(key).await?;
        self.add_city(TrackedCity::new(
            removed.district_id,
            &removed.locality,
            station_ids,
        ))
        .await
    }

    /// Station ids of a tracked city.
    pub async fn station_ids(&self, key: &CityKey) -> Option<Vec<StationId>> {
        self.cities
            .read()
            .await
            .get(key)
            .map(|feeds| feeds.city().station_ids.clone())
    }

    /// Feed for one station of one city.
    pub async fn feed(&self, key: &CityKey, id: &StationId) -> Option<StationFeed<S>> {
        self.cities.read().await.get(key)?.feed(id)
    }

    /// Feed for a station in any tracked city.
    pub async fn find_station(&self, id: &StationId) -> Option<StationFeed<S>> {
        self.cities
            .read()
            .await
            .values()
            .find_map(|feeds| feeds.feed(id))
    }

    /// Every feed of one city, in the order the stations were chosen.
    pub async fn city_feeds(&self, key: &CityKey) -> Option<Vec<StationFeed<S>>> {
        self.cities.read().await.get(key).map(|feeds| {
            feeds
                .coordinators()
                .iter()
                .map(|c| c.feed().clone())
                .collect()
        })
    }

    /// Tracked cities, ordered by key.
    pub async fn cities(&self) -> Vec<TrackedCity> {
        let cities = self.cities.read().await;
        let mut keys: Vec<_> = cities.keys().collect();
        keys.sort();
        keys.into_iter().map(|k| cities[k].city().clone()).collect()
    }

    pub async fn len(&self) -> usize {
        self.cities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cities.read().await.is_empty()
    }
}
