//! Domain types for the fuel price tracker.
//!
//! Upstream payloads are parsed into these types exactly once, at fetch
//! time, so code that receives a `Station` can trust every field.

mod district;
mod error;
mod fuel;
mod station;
mod summary;

pub use district::{DISTRICTS, District};
pub use error::MalformedDataError;
pub use fuel::{FuelQuote, parse_price, parse_timestamp};
pub use station::{Address, Coordinates, Station, StationId};
pub use summary::{StationSummary, sort_summaries};
