//! DGEG price API HTTP client.
//!
//! Provides async methods for the two public DGEG endpoints: the district
//! station search and the single-station detail lookup. The API is
//! anonymous, so the client carries no credentials.

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, error, warn};

use crate::domain::{Station, StationId, StationSummary, sort_summaries};

use super::convert::{parse_station, parse_station_list};
use super::error::DgegError;

/// Default base URL for the DGEG price API.
const DEFAULT_BASE_URL: &str = "https://precoscombustiveis.dgeg.gov.pt";

/// Path of the district station search.
const SEARCH_PATH: &str = "/api/PrecoComb/PesquisarPostos";

/// Path of the single-station detail lookup.
const DETAILS_PATH: &str = "/api/PrecoComb/GetDadosPostoMapa";

/// Page size large enough to get a whole district in one page.
const MAX_PAGE_SIZE: u32 = 99_999;

/// Configuration for the DGEG client.
#[derive(Debug, Clone)]
pub struct DgegConfig {
    /// Base URL for the API (defaults to production DGEG)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Skip TLS certificate validation
    pub accept_invalid_certs: bool,
}

impl DgegConfig {
    /// Create a config pointing at the production API.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            accept_invalid_certs: false,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Accept certificates that fail validation.
    ///
    /// The DGEG host has served certificate chains some clients cannot
    /// validate. Only enable this when that is the case.
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}

impl Default for DgegConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// DGEG price API client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct DgegClient {
    http: reqwest::Client,
    base_url: String,
}

impl DgegClient {
    /// Create a new DGEG client with the given configuration.
    pub fn new(config: DgegConfig) -> Result<Self, DgegError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if config.accept_invalid_certs {
            warn!(
                base_url = %config.base_url,
                "TLS certificate validation is disabled for the DGEG API"
            );
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// List every station in a district, sorted for display.
    ///
    /// Best-effort: any failure is logged and yields an empty list. The
    /// search returns one record per station and fuel, so ids repeat.
    pub async fn list_stations(&self, district_id: u8) -> Vec<StationSummary> {
        match self.fetch_station_list(district_id).await {
            Ok(stations) => stations,
            Err(e) => {
                error!(district = district_id, error = %e, "failed to fetch station list");
                Vec::new()
            }
        }
    }

    async fn fetch_station_list(&self, district_id: u8) -> Result<Vec<StationSummary>, DgegError> {
        debug!(district = district_id, "fetching station list");

        let url = format!("{}{}", self.base_url, SEARCH_PATH);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("idDistrito", district_id.to_string()),
                ("qtdPorPagina", MAX_PAGE_SIZE.to_string()),
                ("pagina", "1".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DgegError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let mut stations = parse_station_list(&body)?;
        sort_summaries(&mut stations);

        debug!(
            district = district_id,
            records = stations.len(),
            "fetched station list"
        );

        Ok(stations)
    }

    /// Fetch and parse the current details of one station.
    pub async fn get_station(&self, id: &StationId) -> Result<Station, DgegError> {
        debug!(station = %id, "fetching station details");

        let url = format!("{}{}", self.base_url, DETAILS_PATH);

        let response = self
            .http
            .get(&url)
            .query(&[("id", id.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DgegError::Status {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !is_json(&content_type) {
            return Err(DgegError::ContentType { content_type });
        }

        let body = response.text().await?;

        Ok(parse_station(id, &body)?)
    }

    /// Check that a station id exists, returning its name if it does.
    ///
    /// Upstream answers unknown ids with an empty record rather than an
    /// error, so "exists" means it has a name or at least one fuel.
    pub async fn test_station(&self, id: &StationId) -> Result<Option<String>, DgegError> {
        let station = self.get_station(id).await?;

        if station.is_empty() {
            Ok(None)
        } else {
            Ok(Some(station.name))
        }
    }
}

/// Whether a Content-Type header names JSON, ignoring parameters.
fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|essence| essence.eq_ignore_ascii_case("application/json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::extract::Query;
    use axum::http::{StatusCode as AxumStatus, header};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};

    const STATION_FIXTURE: &str = include_str!("../../data/fixtures/station_65167.json");
    const LIST_FIXTURE: &str = include_str!("../../data/fixtures/district_11.json");

    /// Serve `router` on an ephemeral local port and return its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: &str) -> DgegClient {
        DgegClient::new(DgegConfig::new().with_base_url(base_url).with_timeout(5)).unwrap()
    }

    fn json_body(raw: &'static str) -> Json<serde_json::Value> {
        Json(serde_json::from_str(raw).unwrap())
    }

    async fn details(Query(q): Query<HashMap<String, String>>) -> axum::response::Response {
        match q.get("id").map(String::as_str) {
            Some("65167") => json_body(STATION_FIXTURE).into_response(),
            Some("404") => (AxumStatus::NOT_FOUND, "not found").into_response(),
            Some("html") => (
                [(header::CONTENT_TYPE, "text/html")],
                "<html>maintenance</html>",
            )
                .into_response(),
            Some("charset") => (
                [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
                STATION_FIXTURE,
            )
                .into_response(),
            Some("empty") => Json(serde_json::json!({
                "resultado": {
                    "Nome": "", "Marca": "", "TipoPosto": "",
                    "Morada": {"Latitude": 0, "Longitude": 0},
                    "Combustiveis": []
                }
            }))
            .into_response(),
            Some("broken") => Json(serde_json::json!({"resultado": {"Nome": "x"}})).into_response(),
            _ => (AxumStatus::BAD_REQUEST, "bad id").into_response(),
        }
    }

    async fn search(Query(q): Query<HashMap<String, String>>) -> axum::response::Response {
        let page_ok = q.get("qtdPorPagina").map(String::as_str) == Some("99999")
            && q.get("pagina").map(String::as_str) == Some("1");
        if !page_ok {
            return (AxumStatus::BAD_REQUEST, "bad paging").into_response();
        }
        match q.get("idDistrito").map(String::as_str) {
            Some("11") => json_body(LIST_FIXTURE).into_response(),
            Some("12") => (AxumStatus::INTERNAL_SERVER_ERROR, "boom").into_response(),
            _ => Json(serde_json::json!({"resultado": []})).into_response(),
        }
    }

    fn upstream() -> Router {
        Router::new()
            .route(DETAILS_PATH, get(details))
            .route(SEARCH_PATH, get(search))
    }

    #[test]
    fn config_defaults() {
        let config = DgegConfig::new();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn config_builder() {
        let config = DgegConfig::new()
            .with_base_url("http://localhost:8080/")
            .with_timeout(5)
            .with_accept_invalid_certs(true);

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 5);
        assert!(config.accept_invalid_certs);
    }

    #[test]
    fn json_content_type_detection() {
        assert!(is_json("application/json"));
        assert!(is_json("application/json; charset=utf-8"));
        assert!(is_json("Application/JSON"));
        assert!(!is_json("text/html"));
        assert!(!is_json("application/jsonp"));
        assert!(!is_json(""));
    }

    #[tokio::test]
    async fn get_station_parses_fixture() {
        let base = serve(upstream()).await;
        let id = StationId::parse("65167").unwrap();

        let station = client(&base).get_station(&id).await.unwrap();

        assert_eq!(station.name, "Galp Benfica");
        assert_eq!(station.price("Gasóleo simples"), Some(1.699));
        assert_eq!(station.fuels.len(), 3);
    }

    #[tokio::test]
    async fn get_station_accepts_json_with_charset() {
        let base = serve(upstream()).await;
        let id = StationId::parse("charset").unwrap();

        let station = client(&base).get_station(&id).await.unwrap();

        assert_eq!(station.brand, "Galp");
    }

    #[tokio::test]
    async fn get_station_rejects_non_200() {
        let base = serve(upstream()).await;
        let id = StationId::parse("404").unwrap();

        let err = client(&base).get_station(&id).await.unwrap_err();

        assert!(matches!(err, DgegError::Status { status: 404 }));
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn get_station_rejects_non_json() {
        let base = serve(upstream()).await;
        let id = StationId::parse("html").unwrap();

        let err = client(&base).get_station(&id).await.unwrap_err();

        match err {
            DgegError::ContentType { content_type } => assert_eq!(content_type, "text/html"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn get_station_reports_malformed_payload() {
        let base = serve(upstream()).await;
        let id = StationId::parse("broken").unwrap();

        let err = client(&base).get_station(&id).await.unwrap_err();

        assert!(matches!(err, DgegError::Malformed(_)));
        assert!(!err.is_upstream());
    }

    #[tokio::test]
    async fn get_station_reports_connection_failure() {
        // nothing listens on the discard port
        let client = client("http://127.0.0.1:9");
        let id = StationId::parse("65167").unwrap();

        let err = client.get_station(&id).await.unwrap_err();

        assert!(matches!(err, DgegError::Http(_)));
    }

    #[tokio::test]
    async fn test_station_returns_name_or_none() {
        let base = serve(upstream()).await;
        let client = client(&base);

        let found = client
            .test_station(&StationId::parse("65167").unwrap())
            .await
            .unwrap();
        assert_eq!(found.as_deref(), Some("Galp Benfica"));

        let empty = client
            .test_station(&StationId::parse("empty").unwrap())
            .await
            .unwrap();
        assert_eq!(empty, None);

        assert!(
            client
                .test_station(&StationId::parse("404").unwrap())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn list_stations_sorts_for_display() {
        let base = serve(upstream()).await;

        let stations = client(&base).list_stations(11).await;

        let ids: Vec<_> = stations.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["4410", "1203", "65167", "65167", "88"]);
    }

    #[tokio::test]
    async fn list_stations_degrades_to_empty() {
        let base = serve(upstream()).await;

        assert!(client(&base).list_stations(12).await.is_empty());
        assert!(client("http://127.0.0.1:9").list_stations(11).await.is_empty());
    }
}
