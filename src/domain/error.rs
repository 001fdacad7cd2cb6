// Error kinds raised by the dispatch and detection kernels
use thiserror::Error;

/// Failures of a single crew assignment.
///
/// A missing crew is not an error; see `DispatchOutcome::NoCrewAvailable`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("Invalid coordinate ({latitude}, {longitude}): {reason}")]
    InvalidCoordinate {
        latitude: f64,
        longitude: f64,
        reason: String,
    },
}

/// Failures of a detector invocation. Fatal to the whole batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectorError {
    #[error("Insufficient data: required {required}, got {got}")]
    InsufficientData { required: usize, got: usize },

    #[error("Model fit failure: {0}")]
    ModelFitFailure(String),

    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Reading {reading_id} has no value for feature '{feature}'")]
    MissingFeature { reading_id: String, feature: String },
}

impl DetectorError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        DetectorError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable kind, used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            DetectorError::InsufficientData { .. } => "insufficient_data",
            DetectorError::ModelFitFailure(_) => "model_fit_failure",
            DetectorError::InvalidParameter { .. } => "invalid_parameter",
            DetectorError::MissingFeature { .. } => "missing_feature",
        }
    }
}
