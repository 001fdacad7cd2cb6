// HTTP request handlers
use crate::application::anomaly_service::{DetectionOverrides, SyntheticReport};
use crate::application::dispatch_service::dispatch_batch;
use crate::application::synthetic::SyntheticSpec;
use crate::domain::crew::CrewRecord;
use crate::domain::outage::OutageRecord;
use crate::domain::telemetry::{AnomalySet, TelemetryReading};
use crate::infrastructure::ndjson_stream::stream_from_receiver;
use crate::presentation::api_error::ApiError;
use crate::presentation::app_state::AppState;
use crate::presentation::views::{DispatchEventView, DispatchReportView};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub hours: Option<i32>,
    pub contamination: Option<f64>,
    pub seed: Option<u64>,
}

#[derive(Deserialize)]
pub struct DispatchRequest {
    pub outages: Vec<OutageRecord>,
    pub crews: Vec<CrewRecord>,
}

#[derive(Deserialize)]
pub struct ScreenRequest {
    pub readings: Vec<TelemetryReading>,
    pub contamination: Option<f64>,
    pub seed: Option<u64>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Assign crews to every active outage in the configured roster
pub async fn dispatch_roster(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DispatchReportView>, ApiError> {
    let report = state.dispatch_service.dispatch_active().await?;
    Ok(Json(report.into()))
}

/// Same as `dispatch_roster`, streamed as NDJSON while assignments complete
pub async fn stream_dispatch(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let rx = state.dispatch_service.stream_active().await?;
    Ok(stream_from_receiver(rx, DispatchEventView::from))
}

/// Assign crews for a caller-supplied roster snapshot
pub async fn dispatch_adhoc(Json(request): Json<DispatchRequest>) -> Json<DispatchReportView> {
    let report = dispatch_batch(&request.outages, &request.crews);
    Json(report.into())
}

/// Screen a caller-supplied telemetry batch
pub async fn screen_batch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScreenRequest>,
) -> Result<Json<AnomalySet>, ApiError> {
    let overrides = DetectionOverrides {
        contamination: request.contamination,
        seed: request.seed,
    };
    let result = state.anomaly_service.screen(request.readings, overrides).await?;
    Ok(Json(result))
}

/// Screen a generated batch with known outliers
pub async fn screen_synthetic(
    State(state): State<Arc<AppState>>,
    Query(spec): Query<SyntheticSpec>,
) -> Result<Json<SyntheticReport>, ApiError> {
    let report = state.anomaly_service.screen_synthetic(spec).await?;
    Ok(Json(report))
}

/// Screen the recent telemetry of one source
pub async fn screen_source(
    Path(source): Path<String>,
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<AnomalySet>, ApiError> {
    let hours = query.hours.unwrap_or(6);
    let overrides = DetectionOverrides {
        contamination: query.contamination,
        seed: query.seed,
    };
    let result = state
        .anomaly_service
        .screen_source(&source, hours, overrides)
        .await?;
    Ok(Json(result))
}
