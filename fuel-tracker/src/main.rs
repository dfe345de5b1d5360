use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fuel_tracker::cache::{CacheConfig, CachedStationList};
use fuel_tracker::config::AppConfig;
use fuel_tracker::coordinator::CoordinatorRegistry;
use fuel_tracker::dgeg::DgegClient;
use fuel_tracker::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fuel_tracker=info".into()),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let client = DgegClient::new(config.dgeg.clone()).expect("Failed to create DGEG client");

    let registry = Arc::new(CoordinatorRegistry::new(
        Arc::new(client.clone()),
        config.coordinator.clone(),
    ));

    // a city that fails its first refresh is skipped, not fatal
    for city in config.cities {
        let key = city.key();
        if let Err(e) = registry.add_city(city).await {
            error!(city = %key, error = %e, "failed to start tracking city");
        }
    }
    info!(cities = registry.len().await, "tracking configured cities");

    let listings = CachedStationList::new(client, &CacheConfig::default());
    let app = create_router(AppState::new(registry, listings));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .expect("Failed to bind listen address");
    info!(addr = %config.listen_addr, "fuel tracker listening");

    axum::serve(listener, app).await.expect("Server error");
}
