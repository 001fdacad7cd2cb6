// Mapping of service failures onto HTTP responses
use crate::application::anomaly_service::AnomalyServiceError;
use crate::domain::error::DetectorError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    Detector(DetectorError),
    /// A collaborator (roster files, telemetry feed) failed
    Upstream(anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Detector(DetectorError::ModelFitFailure(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Detector(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Detector(e) => e.kind(),
            ApiError::Upstream(_) => "upstream_failure",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Detector(e) => e.to_string(),
            ApiError::Upstream(e) => format!("{:#}", e),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Upstream(e)
    }
}

impl From<AnomalyServiceError> for ApiError {
    fn from(e: AnomalyServiceError) -> Self {
        match e {
            AnomalyServiceError::Detector(e) => ApiError::Detector(e),
            AnomalyServiceError::Source(e) => ApiError::Upstream(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", message);
        } else {
            tracing::warn!("Request rejected: {}", message);
        }

        (status, Json(json!({ "error": self.kind(), "message": message }))).into_response()
    }
}
