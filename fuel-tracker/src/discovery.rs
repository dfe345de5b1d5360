//! Grouping district listings by locality.
//!
//! Used when choosing what to track: pick a district, then a locality in
//! it, then stations in that locality. The search returns one record per
//! station and fuel, so everything here counts and lists by unique id.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::domain::StationSummary;

/// Locality name used for records without one.
pub const UNKNOWN_LOCALITY: &str = "Desconhecido";

/// A locality and how many distinct stations it has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Locality {
    pub name: String,
    pub station_count: usize,
}

/// Locality a record belongs to, trimmed.
pub fn locality_of(summary: &StationSummary) -> &str {
    summary
        .locality
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_LOCALITY)
}

/// Localities of a listing, sorted by name.
pub fn localities(stations: &[StationSummary]) -> Vec<Locality> {
    let mut ids: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
    for station in stations {
        ids.entry(locality_of(station))
            .or_default()
            .insert(station.id.as_str());
    }

    ids.into_iter()
        .map(|(name, ids)| Locality {
            name: name.to_string(),
            station_count: ids.len(),
        })
        .collect()
}

/// Stations of one locality, one record per id, first record kept.
pub fn stations_in_locality<'a>(
    stations: &'a [StationSummary],
    locality: &str,
) -> Vec<&'a StationSummary> {
    let locality = locality.trim();
    let mut seen = HashSet::new();

    stations
        .iter()
        .filter(|s| locality_of(s) == locality)
        .filter(|s| seen.insert(s.id.as_str()))
        .collect()
}

/// One record per station id, first record kept.
pub fn unique_stations(stations: &[StationSummary]) -> Vec<&StationSummary> {
    let mut seen = HashSet::new();
    stations
        .iter()
        .filter(|s| seen.insert(s.id.as_str()))
        .collect()
}

/// Number of distinct station ids in a listing.
pub fn unique_station_count(stations: &[StationSummary]) -> usize {
    stations
        .iter()
        .map(|s| s.id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Picker label: `"{brand} - {name}"`, with `N/A` for missing parts.
pub fn station_label(summary: &StationSummary) -> String {
    format!(
        "{} - {}",
        summary.brand.as_deref().unwrap_or("N/A"),
        summary.name.as_deref().unwrap_or("N/A")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dgeg::parse_station_list;
    use crate::domain::sort_summaries;

    const LIST_FIXTURE: &str = include_str!("../data/fixtures/district_11.json");

    fn listing() -> Vec<StationSummary> {
        let mut stations = parse_station_list(LIST_FIXTURE).unwrap();
        sort_summaries(&mut stations);
        stations
    }

    #[test]
    fn localities_are_trimmed_and_counted_by_id() {
        let localities = localities(&listing());

        assert_eq!(
            localities,
            [
                Locality {
                    name: "Amadora".into(),
                    station_count: 1
                },
                Locality {
                    name: "Desconhecido".into(),
                    station_count: 1
                },
                Locality {
                    name: "Lisboa".into(),
                    station_count: 1
                },
                Locality {
                    name: "lisboa".into(),
                    station_count: 1
                },
            ]
        );
    }

    #[test]
    fn stations_in_locality_dedups_by_id() {
        let stations = listing();
        let lisboa = stations_in_locality(&stations, " Lisboa");

        assert_eq!(lisboa.len(), 1);
        assert_eq!(lisboa[0].id.as_str(), "65167");
        assert_eq!(lisboa[0].name.as_deref(), Some("Galp Benfica"));
    }

    #[test]
    fn missing_locality_is_unknown() {
        let stations = listing();
        let unknown = stations_in_locality(&stations, UNKNOWN_LOCALITY);

        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].id.as_str(), "4410");
    }

    #[test]
    fn blank_locality_is_unknown() {
        let summary = StationSummary {
            id: 1u64.into(),
            name: None,
            brand: None,
            locality: Some("   ".into()),
        };
        assert_eq!(locality_of(&summary), UNKNOWN_LOCALITY);
        assert_eq!(station_label(&summary), "N/A - N/A");
    }

    #[test]
    fn counts_unique_stations() {
        let stations = listing();
        let ids: Vec<_> = unique_stations(&stations)
            .into_iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, ["4410", "1203", "65167", "88"]);
        assert_eq!(unique_station_count(&stations), 4);
        assert_eq!(unique_station_count(&[]), 0);
    }

    #[test]
    fn label_uses_brand_and_name() {
        let stations = listing();
        let amadora = stations_in_locality(&stations, "Amadora");
        assert_eq!(station_label(amadora[0]), "Repsol - Amadora Norte");
    }
}
