//! Process configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `FUEL_TRACKER_ADDR` | `127.0.0.1:3000` |
//! | `FUEL_TRACKER_CITIES` | none |
//! | `DGEG_BASE_URL` | production API |
//! | `DGEG_TIMEOUT_SECS` | `30` |
//! | `DGEG_ACCEPT_INVALID_CERTS` | `false` |
//! | `UPDATE_INTERVAL_SECS` | `3600`, at most one week |
//!
//! `FUEL_TRACKER_CITIES` lists cities to track at start-up as
//! `<district>:<locality>:<id>,<id>;...`, for example
//! `11:Lisboa:65167,1203;13:Porto:88`.

use std::net::SocketAddr;
use std::time::Duration;

use crate::coordinator::{CoordinatorConfig, MAX_UPDATE_INTERVAL, TrackedCity};
use crate::dgeg::DgegConfig;
use crate::domain::{District, StationId};

const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Errors from reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("invalid city entry {entry:?}: {reason}")]
    InvalidCity { entry: String, reason: &'static str },
}

/// Everything needed to run the server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub dgeg: DgegConfig,
    pub coordinator: CoordinatorConfig,
    /// Cities to track at start-up
    pub cities: Vec<TrackedCity>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let listen_addr = parse_var(
            "FUEL_TRACKER_ADDR",
            &var("FUEL_TRACKER_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string()),
        )?;

        let mut dgeg = DgegConfig::new();
        if let Some(url) = var("DGEG_BASE_URL") {
            dgeg = dgeg.with_base_url(url.trim());
        }
        if let Some(secs) = var("DGEG_TIMEOUT_SECS") {
            dgeg = dgeg.with_timeout(parse_var("DGEG_TIMEOUT_SECS", &secs)?);
        }
        if let Some(accept) = var("DGEG_ACCEPT_INVALID_CERTS") {
            dgeg = dgeg.with_accept_invalid_certs(parse_bool("DGEG_ACCEPT_INVALID_CERTS", &accept)?);
        }

        let mut coordinator = CoordinatorConfig::new();
        if let Some(secs) = var("UPDATE_INTERVAL_SECS") {
            let secs: u64 = parse_var("UPDATE_INTERVAL_SECS", &secs)?;
            if secs == 0 || secs > MAX_UPDATE_INTERVAL.as_secs() {
                return Err(ConfigError::InvalidValue {
                    var: "UPDATE_INTERVAL_SECS",
                    value: secs.to_string(),
                });
            }
            coordinator = coordinator.with_update_interval(Duration::from_secs(secs));
        }

        let cities = match var("FUEL_TRACKER_CITIES") {
            Some(raw) => parse_cities(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            listen_addr,
            dgeg,
            coordinator,
            cities,
        })
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
    })
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
        }),
    }
}

/// Parse `<district>:<locality>:<id>,<id>;...`.
pub fn parse_cities(raw: &str) -> Result<Vec<TrackedCity>, ConfigError> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_city)
        .collect()
}

fn parse_city(entry: &str) -> Result<TrackedCity, ConfigError> {
    let invalid = |reason| ConfigError::InvalidCity {
        entry: entry.to_string(),
        reason,
    };

    let mut parts = entry.splitn(3, ':');
    let (Some(district), Some(locality), Some(ids)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid("expected <district>:<locality>:<ids>"));
    };

    let district_id: u8 = district
        .trim()
        .parse()
        .map_err(|_| invalid("district is not a number"))?;
    if District::by_id(district_id).is_none() {
        return Err(invalid("unknown district"));
    }

    if locality.trim().is_empty() {
        return Err(invalid("locality is empty"));
    }

    let station_ids = ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| StationId::parse(id).map_err(|_| invalid("bad station id")))
        .collect::<Result<Vec<_>, _>>()?;
    if station_ids.is_empty() {
        return Err(invalid("no station ids"));
    }

    Ok(TrackedCity::new(district_id, locality, station_ids))
}
