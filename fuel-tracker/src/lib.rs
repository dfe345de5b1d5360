//! Portuguese fuel price tracker.
//!
//! Polls the DGEG public price API for a chosen set of stations, grouped
//! by city, and serves the latest known prices over a small JSON API.

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod dgeg;
pub mod discovery;
pub mod domain;
pub mod web;
