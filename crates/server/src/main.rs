mod api;
mod config;
mod dto;
mod error;
mod state;

use std::{sync::Arc, time::Instant};

use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use waypoint::{
    fare::VehicleClass,
    quotes::{QuoteAggregator, producer::HttpQuoteProducer, QuoteProducer},
    schedule::ScheduleIndex,
};

use crate::{config::ServerConfig, state::AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let config = ServerConfig::from_env();

    let schedule = match &config.gtfs_dir {
        Some(dir) => {
            info!("loading GTFS feed from {}", dir.display());
            let now = Instant::now();
            let index = ScheduleIndex::load(dir);
            info!("feed load took {:?}", now.elapsed());
            index
        }
        None => {
            warn!("WAYPOINT_GTFS_DIR not set, bus planner disabled");
            ScheduleIndex::disabled()
        }
    };

    let producers = registered_producers(&config);
    let aggregator = QuoteAggregator::new(producers, config.cache_ttl);

    let app_state = Arc::new(AppState { schedule, aggregator });

    info!("starting server...");

    let app = axum::Router::new()
        .route("/api/compare-fares", post(api::compare_fares))
        .route("/api/bus-routes", post(api::bus_routes))
        .route("/healthz", get(api::healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await.unwrap();
    info!("listening on port {}", config.port);
    axum::serve(listener, app).await.unwrap();
}

/// The full producer roster, narrowed to `WAYPOINT_PRODUCERS` when that
/// variable is set. Endpoint URLs are placeholders for the opaque-HTTP
/// shape every concrete platform integration narrows down to; real
/// deployments substitute their own.
fn registered_producers(config: &ServerConfig) -> Vec<Arc<dyn QuoteProducer>> {
    let all: Vec<Arc<dyn QuoteProducer>> = vec![
        Arc::new(HttpQuoteProducer::new(
            "nimbus",
            "http://localhost:9001/quote",
            "INR",
            vec![VehicleClass::Mini, VehicleClass::Sedan, VehicleClass::Suv],
            config.producer_timeout,
        )),
        Arc::new(HttpQuoteProducer::new(
            "zephyr",
            "http://localhost:9002/quote",
            "INR",
            vec![VehicleClass::Bike, VehicleClass::Auto, VehicleClass::Mini],
            config.producer_timeout,
        )),
    ];

    match &config.enabled_producers {
        Some(allowed) => all.into_iter().filter(|p| allowed.iter().any(|name| name == p.platform_name())).collect(),
        None => all,
    }
}
