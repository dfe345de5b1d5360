//! HTTP route handlers.

use std::collections::HashSet;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::warn;

use crate::coordinator::{CityKey, RegistryError, StationFeed, StationSource, TrackedCity};
use crate::dgeg::{DgegClient, DgegError};
use crate::discovery::{localities, stations_in_locality, unique_station_count, unique_stations};
use crate::domain::{DISTRICTS, District, StationId};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/districts", get(list_districts))
        .route("/api/districts/:id/stations", get(district_stations))
        .route("/api/districts/:id/localities", get(district_localities))
        .route("/api/cities", get(list_cities).post(add_city))
        .route(
            "/api/cities/:district_id/:locality",
            get(city_stations).delete(remove_city),
        )
        .route(
            "/api/cities/:district_id/:locality/reload",
            post(reload_city),
        )
        .route("/api/stations/:id", get(station_state))
        .route("/api/stations/:id/refresh", post(refresh_station))
        .route("/api/probe/:id", get(probe_station))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn list_districts() -> Json<Vec<DistrictResult>> {
    Json(DISTRICTS.iter().map(DistrictResult::from).collect())
}

fn parse_district_id(raw: &str) -> Result<u8, AppError> {
    raw.trim().parse().map_err(|_| AppError::BadRequest {
        message: format!("Invalid district id: {raw}"),
    })
}

fn find_district(raw: &str) -> Result<District, AppError> {
    let id = parse_district_id(raw)?;
    District::by_id(id).ok_or_else(|| AppError::NotFound {
        message: format!("Unknown district: {id}"),
    })
}

fn parse_station_ids(raw: &[String]) -> Result<Vec<StationId>, AppError> {
    raw.iter()
        .map(|id| {
            StationId::parse(id).map_err(|e| AppError::Unprocessable {
                message: e.to_string(),
            })
        })
        .collect()
}

fn parse_station_id(raw: &str) -> Result<StationId, AppError> {
    StationId::parse(raw).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })
}

/// Stations of a district, one entry per station.
async fn district_stations(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(req): Query<StationListRequest>,
) -> Result<Json<Vec<StationSummaryResult>>, AppError> {
    let district = find_district(&id)?;

    let listing = state.listings.list_stations(district.id).await;
    let stations = match req.locality.as_deref() {
        Some(locality) => stations_in_locality(&listing, locality),
        None => unique_stations(&listing),
    };

    Ok(Json(
        stations
            .into_iter()
            .map(StationSummaryResult::from)
            .collect(),
    ))
}

/// Localities of a district, flagging those already tracked.
async fn district_localities(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LocalitiesResponse>, AppError> {
    let district = find_district(&id)?;

    let listing = state.listings.list_stations(district.id).await;
    let tracked: HashSet<String> = state
        .registry
        .cities()
        .await
        .into_iter()
        .filter(|c| c.district_id == district.id)
        .map(|c| c.locality)
        .collect();

    let localities = localities(&listing)
        .into_iter()
        .map(|l| LocalityResult {
            tracked: tracked.contains(&l.name),
            name: l.name,
            station_count: l.station_count,
        })
        .collect();

    Ok(Json(LocalitiesResponse {
        district: DistrictResult::from(&district),
        total_stations: unique_station_count(&listing),
        localities,
    }))
}

async fn list_cities(State(state): State<AppState>) -> Json<Vec<CityResult>> {
    let cities = state.registry.cities().await;
    Json(cities.iter().map(CityResult::from).collect())
}

/// Start tracking a city. Every station is fetched before this returns.
async fn add_city(
    State(state): State<AppState>,
    Json(req): Json<AddCityRequest>,
) -> Result<(StatusCode, Json<CityResult>), AppError> {
    if District::by_id(req.district_id).is_none() {
        return Err(AppError::Unprocessable {
            message: format!("Unknown district: {}", req.district_id),
        });
    }
    if req.locality.trim().is_empty() {
        return Err(AppError::Unprocessable {
            message: "Locality is empty".to_string(),
        });
    }

    let station_ids = parse_station_ids(&req.station_ids)?;

    let city = TrackedCity::new(req.district_id, &req.locality, station_ids);
    state.registry.add_city(city.clone()).await?;

    Ok((StatusCode::CREATED, Json(CityResult::from(&city))))
}

fn city_key(district_id: &str, locality: &str) -> Result<CityKey, AppError> {
    Ok(CityKey::new(parse_district_id(district_id)?, locality))
}

async fn remove_city(
    State(state): State<AppState>,
    Path((district_id, locality)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    state
        .registry
        .remove_city(&city_key(&district_id, &locality)?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Latest state of every station of a city.
async fn city_stations(
    State(state): State<AppState>,
    Path((district_id, locality)): Path<(String, String)>,
) -> Result<Json<Vec<StationStateResult>>, AppError> {
    let key = city_key(&district_id, &locality)?;
    city_states(&state, &key).await.map(Json)
}

/// Restart a city's coordinators, fetching every station again.
///
/// An optional `{"station_ids": [..]}` body replaces the city's stations;
/// without one the current stations are kept.
async fn reload_city(
    State(state): State<AppState>,
    Path((district_id, locality)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Vec<StationStateResult>>, AppError> {
    let key = city_key(&district_id, &locality)?;

    let req: Option<ReloadCityRequest> = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest {
            message: format!("Invalid request body: {e}"),
        })?
    };

    let station_ids = match req.and_then(|r| r.station_ids) {
        Some(raw) => parse_station_ids(&raw)?,
        None => state
            .registry
            .station_ids(&key)
            .await
            .ok_or_else(|| RegistryError::NotTracked(key.clone()))?,
    };

    let key = state.registry.reload_city(&key, station_ids).await?;
    city_states(&state, &key).await.map(Json)
}

async fn city_states(state: &AppState, key: &CityKey) -> Result<Vec<StationStateResult>, AppError> {
    let feeds = state
        .registry
        .city_feeds(key)
        .await
        .ok_or_else(|| AppError::NotFound {
            message: format!("City {key} is not tracked"),
        })?;

    let mut states = Vec::with_capacity(feeds.len());
    for feed in &feeds {
        states.push(station_state_result(feed).await);
    }
    Ok(states)
}

async fn tracked_feed(state: &AppState, raw_id: &str) -> Result<StationFeed<DgegClient>, AppError> {
    let id = parse_station_id(raw_id)?;
    state
        .registry
        .find_station(&id)
        .await
        .ok_or_else(|| AppError::NotFound {
            message: format!("Station {id} is not tracked"),
        })
}

/// Latest known state of a tracked station.
async fn station_state(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StationStateResult>, AppError> {
    let feed = tracked_feed(&state, &id).await?;
    Ok(Json(station_state_result(&feed).await))
}

/// Refresh a tracked station now.
async fn refresh_station(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RefreshResponse>, AppError> {
    let feed = tracked_feed(&state, &id).await?;
    let outcome = feed.refresh().await;

    Ok(Json(RefreshResponse {
        outcome: outcome_name(outcome),
        state: station_state_result(&feed).await,
    }))
}

/// Check a station id against upstream without tracking it.
async fn probe_station(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProbeResponse>, AppError> {
    let id = parse_station_id(&id)?;
    let name = state.client().test_station(&id).await?;

    Ok(Json(ProbeResponse {
        station_id: id.to_string(),
        exists: name.is_some(),
        name,
    }))
}

async fn station_state_result<S: StationSource>(feed: &StationFeed<S>) -> StationStateResult {
    StationStateResult {
        station_id: feed.station_id().to_string(),
        status: status_name(feed.status().await),
        last_fetch_at: feed.last_fetch_at().await.map(|t| t.to_rfc3339()),
        last_error: feed.last_failure().await.as_ref().map(FailureResult::from),
        station: feed
            .current_data()
            .await
            .map(|s| StationResult::from(s.as_ref())),
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    Unprocessable { message: String },
    BadGateway { message: String },
}

impl From<RegistryError> for AppError {
    fn from(e: RegistryError) -> Self {
        let message = e.to_string();
        match e {
            RegistryError::NoStations => AppError::Unprocessable { message },
            RegistryError::AlreadyTracked(_) => AppError::Conflict { message },
            RegistryError::NotTracked(_) => AppError::NotFound { message },
            RegistryError::FirstRefresh { .. } => AppError::BadGateway { message },
        }
    }
}

impl From<DgegError> for AppError {
    fn from(e: DgegError) -> Self {
        AppError::BadGateway {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::Unprocessable { message } => (StatusCode::UNPROCESSABLE_ENTITY, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
        };

        warn!(status = status.as_u16(), error = %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
