//! Station search results.

use std::cmp::Ordering;

use super::station::StationId;

/// One record from a district station search.
///
/// Only the fields needed to pick stations are kept, and every one of them
/// except the id may be missing upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationSummary {
    pub id: StationId,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub locality: Option<String>,
}

impl StationSummary {
    /// Sort key: (locality, brand, name), lower-cased, absent as "".
    fn sort_key(&self) -> (String, String, String) {
        let lower = |s: &Option<String>| s.as_deref().unwrap_or_default().to_lowercase();
        (lower(&self.locality), lower(&self.brand), lower(&self.name))
    }

    /// Case-insensitive display ordering used for station pickers.
    pub fn display_cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// Sort summaries for display. Stable, so equal keys keep upstream order.
pub fn sort_summaries(stations: &mut [StationSummary]) {
    stations.sort_by(StationSummary::display_cmp);
}
