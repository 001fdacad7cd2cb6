// Anomaly service - Use cases for screening telemetry batches
use crate::application::detector::{detect_with, DetectorParams};
use crate::application::roster_repository::TelemetrySource;
use crate::application::synthetic::{generate, SyntheticSpec};
use crate::domain::error::DetectorError;
use crate::domain::telemetry::{AnomalySet, TelemetryReading};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnomalyServiceError {
    #[error(transparent)]
    Detector(#[from] DetectorError),

    #[error("Telemetry source failed: {0:#}")]
    Source(anyhow::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct SyntheticReport {
    pub injected: Vec<String>,
    pub result: AnomalySet,
}

/// Per-call overrides of the configured detector parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectionOverrides {
    pub contamination: Option<f64>,
    pub seed: Option<u64>,
}

#[derive(Clone)]
pub struct AnomalyService {
    source: Arc<dyn TelemetrySource>,
    params: DetectorParams,
}

impl AnomalyService {
    pub fn new(source: Arc<dyn TelemetrySource>, params: DetectorParams) -> Self {
        Self { source, params }
    }

    /// Screen a caller-supplied batch
    pub async fn screen(
        &self,
        readings: Vec<TelemetryReading>,
        overrides: DetectionOverrides,
    ) -> Result<AnomalySet, AnomalyServiceError> {
        let params = self.resolve(overrides);
        run_detection(readings, params).await
    }

    /// Pull the latest window from the telemetry feed and screen it
    pub async fn screen_source(
        &self,
        source: &str,
        hours: i32,
        overrides: DetectionOverrides,
    ) -> Result<AnomalySet, AnomalyServiceError> {
        let readings = self
            .source
            .fetch_readings(source, hours)
            .await
            .map_err(AnomalyServiceError::Source)?;

        tracing::info!("Screening {} readings from {} (last {}h)", readings.len(), source, hours);
        self.screen(readings, overrides).await
    }

    /// Screen a generated batch with known injected outliers
    pub async fn screen_synthetic(&self, spec: SyntheticSpec) -> Result<SyntheticReport, AnomalyServiceError> {
        spec.validate()?;
        let (readings, injected) = generate(&spec);
        let result = self
            .screen(
                readings,
                DetectionOverrides {
                    contamination: None,
                    seed: Some(spec.seed),
                },
            )
            .await?;
        Ok(SyntheticReport { injected, result })
    }

    fn resolve(&self, overrides: DetectionOverrides) -> DetectorParams {
        let mut params = self.params.clone();
        if let Some(contamination) = overrides.contamination {
            params.contamination = contamination;
        }
        if let Some(seed) = overrides.seed {
            params.seed = seed;
        }
        params
    }
}

/// Model fitting is CPU bound; each call owns its own model instance
async fn run_detection(
    readings: Vec<TelemetryReading>,
    params: DetectorParams,
) -> Result<AnomalySet, AnomalyServiceError> {
    let result = tokio::task::spawn_blocking(move || detect_with(&readings, &params))
        .await
        .map_err(|e| DetectorError::ModelFitFailure(format!("detector task failed: {}", e)))??;

    if !result.is_empty() {
        tracing::warn!(
            "{} anomalous readings in batch of {}",
            result.len(),
            result.batch_size
        );
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct SyntheticSource;

    #[async_trait]
    impl TelemetrySource for SyntheticSource {
        async fn fetch_readings(&self, _source: &str, _hours: i32) -> anyhow::Result<Vec<TelemetryReading>> {
            Ok(generate(&SyntheticSpec::new(100, 2, 4)).0)
        }
    }

    struct DownSource;

    #[async_trait]
    impl TelemetrySource for DownSource {
        async fn fetch_readings(&self, _source: &str, _hours: i32) -> anyhow::Result<Vec<TelemetryReading>> {
            anyhow::bail!("connection refused")
        }
    }

    fn service(source: Arc<dyn TelemetrySource>) -> AnomalyService {
        AnomalyService::new(source, DetectorParams::default())
    }

    #[tokio::test]
    async fn test_screen_source() {
        let result = service(Arc::new(SyntheticSource))
            .screen_source("substation-4", 6, DetectionOverrides::default())
            .await
            .unwrap();
        assert_eq!(result.batch_size, 100);
        assert_eq!(result.ids(), vec!["reading-0025", "reading-0075"]);
    }

    #[tokio::test]
    async fn test_source_failure_is_surfaced() {
        let err = service(Arc::new(DownSource))
            .screen_source("substation-4", 6, DetectionOverrides::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AnomalyServiceError::Source(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_overrides_apply() {
        let (readings, _) = generate(&SyntheticSpec::new(50, 1, 2));
        let result = service(Arc::new(SyntheticSource))
            .screen(
                readings,
                DetectionOverrides {
                    contamination: Some(0.1),
                    seed: Some(3),
                },
            )
            .await
            .unwrap();
        assert_eq!(result.contamination, 0.1);
    }

    #[tokio::test]
    async fn test_insufficient_batch_is_an_error() {
        let (readings, _) = generate(&SyntheticSpec::new(4, 0, 2));
        let err = service(Arc::new(SyntheticSource))
            .screen(readings, DetectionOverrides::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AnomalyServiceError::Detector(DetectorError::InsufficientData { .. })
        ));
    }

    #[tokio::test]
    async fn test_oversized_synthetic_batch_is_rejected() {
        let err = service(Arc::new(SyntheticSource))
            .screen_synthetic(SyntheticSpec::new(usize::MAX, usize::MAX, 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AnomalyServiceError::Detector(DetectorError::InvalidParameter { .. })
        ));
    }

    #[tokio::test]
    async fn test_screen_synthetic_reports_injected_ids() {
        let report = service(Arc::new(SyntheticSource))
            .screen_synthetic(SyntheticSpec::new(100, 2, 8))
            .await
            .unwrap();
        assert_eq!(report.injected, vec!["reading-0025", "reading-0075"]);
        assert_eq!(
            report.result.ids(),
            report.injected.iter().map(String::as_str).collect::<Vec<_>>()
        );
    }
}
