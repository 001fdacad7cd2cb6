// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::anomaly_service::AnomalyService;
use crate::application::detector::DetectorParams;
use crate::application::dispatch_service::DispatchService;
use crate::infrastructure::config::load_config;
use crate::infrastructure::file_repository::JsonRosterRepository;
use crate::infrastructure::influx_source::InfluxTelemetrySource;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    dispatch_adhoc, dispatch_roster, health_check, screen_batch, screen_source, screen_synthetic,
    stream_dispatch,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_config()?;
    let params = DetectorParams::from(config.detector.clone());

    // Create collaborators (infrastructure layer)
    let roster = Arc::new(JsonRosterRepository::new(
        &config.roster.outages_path,
        &config.roster.crews_path,
    ));
    let telemetry = Arc::new(InfluxTelemetrySource::new(
        config.influx.clone(),
        params.features.clone(),
    ));

    // Create services (application layer)
    let dispatch_service = DispatchService::new(roster);
    let anomaly_service = AnomalyService::new(telemetry, params);

    let state = Arc::new(AppState {
        dispatch_service,
        anomaly_service,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dispatch", get(dispatch_roster).post(dispatch_adhoc))
        .route("/dispatch/stream", get(stream_dispatch))
        .route("/anomalies", post(screen_batch))
        .route("/anomalies/synthetic", get(screen_synthetic))
        .route("/anomalies/:source", get(screen_source))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.server.addr).await?;
    tracing::info!(
        "Starting outage-response service on {} (contamination {})",
        listener.local_addr()?,
        config.detector.contamination
    );

    axum::serve(listener, router).await?;

    Ok(())
}
