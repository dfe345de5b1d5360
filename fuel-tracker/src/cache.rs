//! Caching layer for DGEG station listings.
//!
//! A district search returns every station and fuel in the district, which
//! is large and changes slowly. Listings are only needed while a user picks
//! stations, so they are cached per district for an hour.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::dgeg::DgegClient;
use crate::domain::StationSummary;

/// Cached listing of one district.
type ListingEntry = Arc<Vec<StationSummary>>;

/// Configuration for the listing cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached districts.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            max_capacity: 32,
        }
    }
}

/// DGEG client with cached district listings.
pub struct CachedStationList {
    client: DgegClient,
    listings: MokaCache<u8, ListingEntry>,
}

impl CachedStationList {
    /// Create a new cached listing client.
    pub fn new(client: DgegClient, config: &CacheConfig) -> Self {
        let listings = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { client, listings }
    }

    /// Stations of a district, sorted for display.
    ///
    /// Empty listings are not cached: upstream failures come back empty and
    /// should be retried on the next call.
    pub async fn list_stations(&self, district_id: u8) -> ListingEntry {
        if let Some(cached) = self.listings.get(&district_id).await {
            debug!(district = district_id, "station list cache hit");
            return cached;
        }

        let entry = Arc::new(self.client.list_stations(district_id).await);

        if !entry.is_empty() {
            self.listings.insert(district_id, entry.clone()).await;
        }

        entry
    }

    /// Access the underlying client for operations that bypass cache.
    pub fn client(&self) -> &DgegClient {
        &self.client
    }

    /// Drop every cached listing.
    pub fn invalidate_all(&self) {
        self.listings.invalidate_all();
    }
}
