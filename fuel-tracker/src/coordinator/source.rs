//! Where coordinators get station data from.

use std::future::Future;

use crate::dgeg::{DgegClient, DgegError};
use crate::domain::{Station, StationId};

/// Trait for fetching station snapshots.
///
/// This allows coordinators to be exercised with scripted data in tests
/// and with the live DGEG client in production.
pub trait StationSource: Send + Sync + 'static {
    /// Fetch the current snapshot of one station.
    fn fetch_station(
        &self,
        id: &StationId,
    ) -> impl Future<Output = Result<Station, DgegError>> + Send;
}

impl StationSource for DgegClient {
    async fn fetch_station(&self, id: &StationId) -> Result<Station, DgegError> {
        self.get_station(id).await
    }
}
