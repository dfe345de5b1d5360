//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::coordinator::{
    CoordinatorStatus, ErrorKind, RefreshFailure, RefreshOutcome, TrackedCity,
};
use crate::discovery::station_label;
use crate::domain::{District, FuelQuote, Station, StationSummary};

/// Format of fuel price update times.
const PRICE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A district.
#[derive(Debug, Serialize)]
pub struct DistrictResult {
    pub id: u8,
    pub name: String,
}

/// Query for a district listing.
#[derive(Debug, Deserialize)]
pub struct StationListRequest {
    /// Only stations in this locality
    pub locality: Option<String>,
}

/// A station in a district listing.
#[derive(Debug, Serialize)]
pub struct StationSummaryResult {
    pub id: String,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub locality: Option<String>,

    /// `"{brand} - {name}"`
    pub label: String,
}

/// Localities of a district.
#[derive(Debug, Serialize)]
pub struct LocalitiesResponse {
    pub district: DistrictResult,

    /// Distinct stations in the whole district
    pub total_stations: usize,

    pub localities: Vec<LocalityResult>,
}

/// A locality and its station count.
#[derive(Debug, Serialize)]
pub struct LocalityResult {
    pub name: String,
    pub station_count: usize,

    /// Whether this locality is already tracked
    pub tracked: bool,
}

/// Request to start tracking a city.
#[derive(Debug, Deserialize)]
pub struct AddCityRequest {
    pub district_id: u8,
    pub locality: String,
    pub station_ids: Vec<String>,
}

/// Optional body of a city reload.
#[derive(Debug, Deserialize)]
pub struct ReloadCityRequest {
    /// Replacement stations; the current ones when absent
    pub station_ids: Option<Vec<String>>,
}

/// A tracked city.
#[derive(Debug, Serialize)]
pub struct CityResult {
    /// `"{district_id}_{locality}"`
    pub key: String,
    pub district_id: u8,
    pub district_name: Option<String>,
    pub locality: String,
    pub station_ids: Vec<String>,
}

/// One fuel price.
#[derive(Debug, Serialize)]
pub struct FuelResult {
    pub fuel_type: String,

    /// Euro per litre
    pub price: f64,

    /// `YYYY-MM-DD HH:MM`, Portuguese local time
    pub last_updated_at: String,
}

/// A station snapshot.
#[derive(Debug, Serialize)]
pub struct StationResult {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub brand: String,

    /// Lower-cased alphabetic brand, absent for unbranded stations
    pub brand_key: Option<String>,
    pub station_type: String,
    pub street: Option<String>,
    pub locality: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub fuels: Vec<FuelResult>,
}

/// Last refresh failure of a station.
#[derive(Debug, Serialize)]
pub struct FailureResult {
    pub kind: &'static str,
    pub message: String,

    /// RFC 3339
    pub at: String,
}

/// Latest known state of a tracked station.
#[derive(Debug, Serialize)]
pub struct StationStateResult {
    pub station_id: String,
    pub status: &'static str,

    /// RFC 3339 time of the last successful fetch
    pub last_fetch_at: Option<String>,
    pub last_error: Option<FailureResult>,

    /// Last good snapshot; kept while later refreshes fail
    pub station: Option<StationResult>,
}

/// Result of a manual refresh.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// `updated`, `failed` or `skipped`
    pub outcome: &'static str,
    pub state: StationStateResult,
}

/// Result of probing a station id upstream.
#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub station_id: String,
    pub exists: bool,
    pub name: Option<String>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl From<&District> for DistrictResult {
    fn from(district: &District) -> Self {
        Self {
            id: district.id,
            name: district.name.to_string(),
        }
    }
}

impl From<&StationSummary> for StationSummaryResult {
    fn from(summary: &StationSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            name: summary.name.clone(),
            brand: summary.brand.clone(),
            locality: summary.locality.clone(),
            label: station_label(summary),
        }
    }
}

impl From<&TrackedCity> for CityResult {
    fn from(city: &TrackedCity) -> Self {
        Self {
            key: city.key().to_string(),
            district_id: city.district_id,
            district_name: District::by_id(city.district_id).map(|d| d.name.to_string()),
            locality: city.locality.clone(),
            station_ids: city.station_ids.iter().map(|id| id.to_string()).collect(),
        }
    }
}

impl From<&FuelQuote> for FuelResult {
    fn from(fuel: &FuelQuote) -> Self {
        Self {
            fuel_type: fuel.fuel_type.clone(),
            price: fuel.price,
            last_updated_at: fuel.last_updated_at.format(PRICE_TIME_FORMAT).to_string(),
        }
    }
}

impl From<&Station> for StationResult {
    fn from(station: &Station) -> Self {
        let address = station.address.as_ref();
        Self {
            id: station.id.to_string(),
            name: station.name.clone(),
            display_name: station.display_name(),
            brand: station.brand.clone(),
            brand_key: station.brand_key(),
            station_type: station.station_type.clone(),
            street: address.and_then(|a| a.street.clone()),
            locality: address.and_then(|a| a.locality.clone()),
            postal_code: address.and_then(|a| a.postal_code.clone()),
            latitude: station.latitude(),
            longitude: station.longitude(),
            fuels: station.fuels.iter().map(FuelResult::from).collect(),
        }
    }
}

impl From<&RefreshFailure> for FailureResult {
    fn from(failure: &RefreshFailure) -> Self {
        Self {
            kind: error_kind_name(failure.kind),
            message: failure.message.clone(),
            at: failure.at.to_rfc3339(),
        }
    }
}

pub fn error_kind_name(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Upstream => "upstream",
        ErrorKind::MalformedData => "malformed_data",
        ErrorKind::EmptyResult => "empty_result",
    }
}

pub fn status_name(status: CoordinatorStatus) -> &'static str {
    match status {
        CoordinatorStatus::Uninitialized => "uninitialized",
        CoordinatorStatus::Ready => "ready",
        CoordinatorStatus::Failed => "failed",
    }
}

pub fn outcome_name(outcome: RefreshOutcome) -> &'static str {
    match outcome {
        RefreshOutcome::Updated => "updated",
        RefreshOutcome::Failed(_) => "failed",
        RefreshOutcome::Skipped => "skipped",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dgeg::parse_station;
    use crate::domain::StationId;
    use chrono::{TimeZone, Utc};

    const STATION_FIXTURE: &str = include_str!("../../data/fixtures/station_65167.json");

    fn fixture() -> Station {
        parse_station(&StationId::parse("65167").unwrap(), STATION_FIXTURE).unwrap()
    }

    #[test]
    fn station_result_from_station() {
        let result = StationResult::from(&fixture());

        assert_eq!(result.id, "65167");
        assert_eq!(result.display_name, "Galp Benfica");
        assert_eq!(result.brand_key.as_deref(), Some("galp"));
        assert_eq!(result.locality.as_deref(), Some("Lisboa"));
        assert_eq!(result.fuels.len(), 3);
        assert_eq!(result.fuels[0].fuel_type, "Gasóleo simples");
        assert_eq!(result.fuels[0].price, 1.699);
        assert_eq!(result.fuels[0].last_updated_at, "2024-03-01 14:05");
    }

    #[test]
    fn failure_result_uses_rfc3339() {
        let failure = RefreshFailure {
            kind: ErrorKind::MalformedData,
            message: "malformed station data: missing required field: Nome".into(),
            at: Utc.with_ymd_and_hms(2024, 3, 1, 14, 5, 0).unwrap(),
        };

        let result = FailureResult::from(&failure);

        assert_eq!(result.kind, "malformed_data");
        assert_eq!(result.at, "2024-03-01T14:05:00+00:00");
    }

    #[test]
    fn city_result_names_district() {
        let city = TrackedCity::new(11, "Lisboa", vec![StationId::from(65167)]);

        let result = CityResult::from(&city);

        assert_eq!(result.key, "11_Lisboa");
        assert_eq!(result.district_name.as_deref(), Some("Lisboa"));
        assert_eq!(result.station_ids, ["65167"]);
    }

    #[test]
    fn summary_result_has_label() {
        let summary = StationSummary {
            id: StationId::from(1203),
            name: Some("Amadora Norte".into()),
            brand: Some("Repsol".into()),
            locality: Some("Amadora".into()),
        };

        let result = StationSummaryResult::from(&summary);

        assert_eq!(result.label, "Repsol - Amadora Norte");
    }

    #[test]
    fn enum_names() {
        assert_eq!(status_name(CoordinatorStatus::Uninitialized), "uninitialized");
        assert_eq!(outcome_name(RefreshOutcome::Failed(ErrorKind::Upstream)), "failed");
        assert_eq!(error_kind_name(ErrorKind::EmptyResult), "empty_result");
    }
}
