//! DGEG fuel price API client.
//!
//! This module provides an HTTP client for the Portuguese Directorate-General
//! for Energy and Geology (DGEG) fuel price API.
//!
//! Key characteristics of the API:
//! - Anonymous, no authentication
//! - Prices are strings like "1,699 €/litro" (comma decimal separator)
//! - Update times are "YYYY-MM-DD HH:MM" with no timezone
//! - The district search returns one record per station *and* fuel

mod client;
mod convert;
mod error;
mod types;

pub use client::{DgegClient, DgegConfig};
pub use convert::{convert_station, parse_station, parse_station_list};
pub use error::DgegError;
pub use types::{
    AddressDto, FuelDto, NumberOrText, StationDetailsDto, StationDetailsResponse,
    StationListItemDto, StationListResponse,
};
