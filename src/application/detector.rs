// Sensor anomaly detection over a single telemetry batch
use crate::application::features::extract;
use crate::application::isolation_forest::IsolationForest;
use crate::domain::error::DetectorError;
use crate::domain::telemetry::{AnomalySet, FeatureSet, FlaggedReading, TelemetryReading};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONTAMINATION: f64 = 0.02;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_TREES: usize = 100;
pub const DEFAULT_MAX_SAMPLES: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorParams {
    pub contamination: f64,
    pub seed: u64,
    pub n_trees: usize,
    pub max_samples: usize,
    pub features: FeatureSet,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            contamination: DEFAULT_CONTAMINATION,
            seed: DEFAULT_SEED,
            n_trees: DEFAULT_TREES,
            max_samples: DEFAULT_MAX_SAMPLES,
            features: FeatureSet::default(),
        }
    }
}

impl DetectorParams {
    pub fn with_contamination(mut self, contamination: f64) -> Self {
        self.contamination = contamination;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Flag the readings of `batch` that the default model finds anomalous
pub fn detect(batch: &[TelemetryReading], contamination: f64) -> Result<AnomalySet, DetectorError> {
    detect_with(batch, &DetectorParams::default().with_contamination(contamination))
}

/// Fit a fresh model on `batch` and return the anomalous readings in batch order
pub fn detect_with(batch: &[TelemetryReading], params: &DetectorParams) -> Result<AnomalySet, DetectorError> {
    let scores = score_batch(batch, params)?;
    let threshold = contamination_threshold(&scores, params.contamination);

    let anomalies: Vec<FlaggedReading> = batch
        .iter()
        .zip(&scores)
        .filter(|(_, score)| **score > threshold)
        .map(|(reading, score)| FlaggedReading {
            reading: reading.clone(),
            score: *score,
            is_anomaly: true,
        })
        .collect();

    tracing::debug!(
        "Flagged {} of {} readings (threshold {:.4})",
        anomalies.len(),
        batch.len(),
        threshold
    );

    Ok(AnomalySet {
        batch_size: batch.len(),
        contamination: params.contamination,
        threshold,
        anomalies,
    })
}

/// Anomaly score of every reading, in batch order
pub fn score_batch(batch: &[TelemetryReading], params: &DetectorParams) -> Result<Vec<f64>, DetectorError> {
    if !(params.contamination > 0.0 && params.contamination < 1.0) {
        return Err(DetectorError::invalid_parameter(
            "contamination",
            format!("must be in (0, 1), got {}", params.contamination),
        ));
    }

    let matrix = extract(batch, &params.features)?;
    let forest = IsolationForest::new(params.n_trees, params.max_samples, params.seed).fit(&matrix)?;
    forest.score_all(&matrix)
}

/// Score above which the expected `contamination` share of the batch lies.
///
/// Linear interpolation between order statistics; a reading is anomalous
/// only when its score is strictly above the threshold.
fn contamination_threshold(scores: &[f64], contamination: f64) -> f64 {
    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let position = (1.0 - contamination) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::synthetic::{generate, SyntheticSpec};
    use chrono::Utc;
    use std::collections::BTreeMap;

    #[test]
    fn test_flags_exactly_the_scaled_readings() {
        let (batch, injected) = generate(&SyntheticSpec::new(100, 2, 7));
        let result = detect(&batch, 0.02).unwrap();

        assert_eq!(result.batch_size, 100);
        assert_eq!(result.ids(), injected.iter().map(String::as_str).collect::<Vec<_>>());
        assert!(result.anomalies.iter().all(|a| a.is_anomaly && a.score > result.threshold));
    }

    #[test]
    fn test_flag_count_tracks_contamination() {
        let (batch, injected) = generate(&SyntheticSpec::new(300, 6, 3));
        let result = detect(&batch, 0.02).unwrap();

        let found = injected
            .iter()
            .filter(|id| result.ids().contains(&id.as_str()))
            .count();
        assert!((4..=8).contains(&result.len()), "flagged {}", result.len());
        assert!(found >= 5, "recovered {} of 6", found);
    }

    #[test]
    fn test_same_seed_same_flags() {
        let (batch, _) = generate(&SyntheticSpec::new(120, 3, 11));
        let params = DetectorParams::default().with_contamination(0.03).with_seed(5);
        let first = detect_with(&batch, &params).unwrap();
        let second = detect_with(&batch, &params).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_results_keep_batch_order() {
        let (batch, _) = generate(&SyntheticSpec::new(100, 4, 21));
        let result = detect(&batch, 0.04).unwrap();
        let positions: Vec<usize> = result
            .ids()
            .iter()
            .map(|id| batch.iter().position(|r| r.id == *id).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_small_batch_is_insufficient() {
        let (batch, _) = generate(&SyntheticSpec::new(5, 0, 1));
        let err = detect(&batch, 0.02).unwrap_err();
        assert!(matches!(err, DetectorError::InsufficientData { got: 5, .. }));
    }

    #[test]
    fn test_empty_batch_is_insufficient() {
        let err = detect(&[], 0.02).unwrap_err();
        assert!(matches!(err, DetectorError::InsufficientData { got: 0, .. }));
    }

    #[test]
    fn test_contamination_must_be_a_fraction() {
        let (batch, _) = generate(&SyntheticSpec::new(50, 1, 1));
        for bad in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            let err = detect(&batch, bad).unwrap_err();
            assert_eq!(err.kind(), "invalid_parameter");
        }
    }

    #[test]
    fn test_missing_dimension_fails_batch() {
        let (mut batch, _) = generate(&SyntheticSpec::new(20, 0, 1));
        batch[3].values.remove("vibration");
        let err = detect(&batch, 0.02).unwrap_err();
        assert!(matches!(err, DetectorError::MissingFeature { .. }));
    }

    #[test]
    fn test_extreme_finite_values_fail_without_panicking() {
        let (mut batch, _) = generate(&SyntheticSpec::new(20, 0, 1));
        batch[4].values.insert("temperature".to_string(), -1.0e308);
        batch[15].values.insert("temperature".to_string(), 1.0e308);

        let err = detect(&batch, 0.02).unwrap_err();
        assert_eq!(err.kind(), "model_fit_failure");
    }

    #[test]
    fn test_uniform_batch_flags_nothing() {
        let values: BTreeMap<String, f64> = [("temperature", 60.0), ("pressure", 30.0), ("vibration", 0.5)]
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        let batch: Vec<TelemetryReading> = (0..20)
            .map(|i| TelemetryReading::new(format!("r{}", i), Utc::now(), values.clone()))
            .collect();
        let result = detect(&batch, 0.1).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_threshold_interpolates() {
        let scores: Vec<f64> = (0..=10).map(|i| i as f64 / 10.0).collect();
        let t = contamination_threshold(&scores, 0.25);
        assert!((t - 0.75).abs() < 1e-12);
    }
}
