//! Gas station types.

use std::fmt;

use chrono::NaiveDateTime;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use super::error::MalformedDataError;
use super::fuel::FuelQuote;

/// Brand DGEG reports for unbranded stations.
const GENERIC_BRAND: &str = "genérico";

/// Opaque DGEG station identifier.
///
/// Upstream ids are numeric, but they are only ever used as keys, so they
/// are kept as text. Blank ids are rejected.
///
/// # Examples
///
/// ```
/// use fuel_tracker::domain::StationId;
///
/// let id = StationId::parse(" 65167 ").unwrap();
/// assert_eq!(id.as_str(), "65167");
/// assert!(StationId::parse("  ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationId(String);

impl StationId {
    /// Parse a station id, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, MalformedDataError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(MalformedDataError::InvalidStationId(s.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for StationId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Postal address of a station. Each part may be missing upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub street: Option<String>,
    pub locality: Option<String>,
    pub postal_code: Option<String>,
}

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A fully parsed snapshot of one station.
///
/// Built once from an upstream payload and never mutated; a newer fetch
/// produces a new `Station`.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub brand: String,
    pub station_type: String,
    pub address: Option<Address>,
    pub coordinates: Coordinates,
    /// Fuels in upstream order.
    pub fuels: Vec<FuelQuote>,
}

impl Station {
    /// Look up a fuel by type. The first entry wins if upstream repeats a type.
    pub fn fuel(&self, fuel_type: &str) -> Option<&FuelQuote> {
        self.fuels.iter().find(|f| f.fuel_type == fuel_type)
    }

    /// Price of a fuel type in euro per litre.
    pub fn price(&self, fuel_type: &str) -> Option<f64> {
        self.fuel(fuel_type).map(|f| f.price)
    }

    /// When the price of a fuel type was last updated.
    pub fn last_update(&self, fuel_type: &str) -> Option<NaiveDateTime> {
        self.fuel(fuel_type).map(|f| f.last_updated_at)
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates.longitude
    }

    /// True when upstream returned a record with neither a name nor fuels.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.fuels.is_empty()
    }

    /// Human-readable label, avoiding "Galp - Galp Lisboa" style repetition.
    pub fn display_name(&self) -> String {
        if self.brand.is_empty() {
            return self.name.clone();
        }
        if self.name.to_lowercase().starts_with(&self.brand.to_lowercase()) {
            self.name.clone()
        } else {
            format!("{} - {}", self.brand, self.name)
        }
    }

    /// Whether the station has no usable brand.
    pub fn is_generic_brand(&self) -> bool {
        let brand = self.brand.trim();
        brand.is_empty() || brand.to_lowercase() == GENERIC_BRAND
    }

    /// Key for looking up a brand logo: lower-cased alphabetic characters
    /// with accents folded, so "Intermarché" becomes "intermarche".
    ///
    /// Returns `None` for generic brands.
    pub fn brand_key(&self) -> Option<String> {
        if self.is_generic_brand() {
            return None;
        }
        let key: String = self
            .brand
            .to_lowercase()
            .nfd()
            .filter(|&c| c.is_alphabetic() && !is_combining_mark(c))
            .collect();
        (!key.is_empty()).then_some(key)
    }
}
