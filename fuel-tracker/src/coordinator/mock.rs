//! Scripted station source for coordinator tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tokio::sync::Notify;

use crate::dgeg::DgegError;
use crate::domain::{Coordinates, FuelQuote, Station, StationId};

use super::source::StationSource;

/// Build a station with a single diesel price.
pub fn station(id: &str, name: &str, price: f64) -> Station {
    Station {
        id: StationId::parse(id).unwrap(),
        name: name.to_string(),
        brand: "Galp".to_string(),
        station_type: "Posto de abastecimento".to_string(),
        address: None,
        coordinates: Coordinates {
            latitude: 38.7,
            longitude: -9.1,
        },
        fuels: vec![FuelQuote {
            fuel_type: "Gasóleo simples".to_string(),
            price,
            last_updated_at: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(14, 5, 0)
                .unwrap(),
        }],
    }
}

pub fn id(s: &str) -> StationId {
    StationId::parse(s).unwrap()
}

/// Station source answering from per-station scripts.
///
/// Each fetch pops the next scripted result for that station; once a
/// script runs out, fetches succeed with a default station.
#[derive(Default)]
pub struct ScriptedSource {
    scripts: Mutex<HashMap<StationId, VecDeque<Result<Station, DgegError>>>>,
    calls: Mutex<HashMap<StationId, usize>>,
    total_calls: AtomicUsize,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, station: Station) {
        let id = station.id.clone();
        self.push(id, Ok(station));
    }

    pub fn push_err(&self, id: &str, err: DgegError) {
        self.push(StationId::parse(id).unwrap(), Err(err));
    }

    fn push(&self, id: StationId, result: Result<Station, DgegError>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(id)
            .or_default()
            .push_back(result);
    }

    /// Make every following fetch wait until `Notify::notify_one` is called.
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, id: &str) -> usize {
        let id = StationId::parse(id).unwrap();
        self.calls.lock().unwrap().get(&id).copied().unwrap_or(0)
    }
}

impl StationSource for ScriptedSource {
    async fn fetch_station(&self, id: &StationId) -> Result<Station, DgegError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        *self.calls.lock().unwrap().entry(id.clone()).or_default() += 1;

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(id)
            .and_then(VecDeque::pop_front);

        next.unwrap_or_else(|| Ok(station(id.as_str(), "Default", 1.0)))
    }
}
