//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedStationList;
use crate::coordinator::CoordinatorRegistry;
use crate::dgeg::DgegClient;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Coordinators of every tracked city
    pub registry: Arc<CoordinatorRegistry<DgegClient>>,

    /// Cached district listings, plus the client for uncached calls
    pub listings: Arc<CachedStationList>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(registry: Arc<CoordinatorRegistry<DgegClient>>, listings: CachedStationList) -> Self {
        Self {
            registry,
            listings: Arc::new(listings),
        }
    }

    pub fn client(&self) -> &DgegClient {
        self.listings.client()
    }
}
