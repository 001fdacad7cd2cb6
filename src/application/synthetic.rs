// Seeded synthetic telemetry with injected outliers
use crate::domain::error::DetectorError;
use crate::domain::telemetry::TelemetryReading;
use chrono::{TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Largest batch a caller may request
pub const MAX_SYNTHETIC_READINGS: usize = 100_000;

/// 2024-01-01T00:00:00Z
const START_EPOCH_SECS: i64 = 1_704_067_200;

/// (name, mean, standard deviation) of each generated dimension
const DIMENSIONS: [(&str, f64, f64); 3] = [
    ("temperature", 60.0, 2.0),
    ("pressure", 30.0, 1.0),
    ("vibration", 0.5, 0.05),
];

#[derive(Debug, Clone, Deserialize)]
pub struct SyntheticSpec {
    pub count: usize,
    #[serde(default)]
    pub outliers: usize,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub seed: u64,
}

fn default_scale() -> f64 {
    2.0
}

impl SyntheticSpec {
    pub fn new(count: usize, outliers: usize, seed: u64) -> Self {
        Self {
            count,
            outliers,
            scale: default_scale(),
            seed,
        }
    }

    pub fn validate(&self) -> Result<(), DetectorError> {
        if self.count > MAX_SYNTHETIC_READINGS {
            return Err(DetectorError::invalid_parameter(
                "count",
                format!("at most {} readings can be generated, got {}", MAX_SYNTHETIC_READINGS, self.count),
            ));
        }
        if !self.scale.is_finite() {
            return Err(DetectorError::invalid_parameter("scale", "must be finite"));
        }
        Ok(())
    }
}

/// Generate `count` readings, one per minute, and multiply every dimension of
/// `outliers` of them by `scale`. Outliers are spread evenly across the batch.
///
/// Returns the readings and the ids of the injected outliers in batch order.
pub fn generate(spec: &SyntheticSpec) -> (Vec<TelemetryReading>, Vec<String>) {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let positions = outlier_positions(spec.count, spec.outliers);

    let mut injected = Vec::with_capacity(positions.len());
    let readings = (0..spec.count)
        .map(|i| {
            let id = format!("reading-{:04}", i);
            let factor = if positions.contains(&i) {
                injected.push(id.clone());
                spec.scale
            } else {
                1.0
            };

            let values: BTreeMap<String, f64> = DIMENSIONS
                .iter()
                .map(|(name, mean, sd)| {
                    let z: f64 = rng.sample(StandardNormal);
                    (name.to_string(), (mean + sd * z) * factor)
                })
                .collect();

            let timestamp = Utc
                .timestamp_opt(START_EPOCH_SECS + i as i64 * 60, 0)
                .single()
                .unwrap_or_default();

            TelemetryReading::new(id, timestamp, values)
        })
        .collect();

    (readings, injected)
}

fn outlier_positions(count: usize, outliers: usize) -> Vec<usize> {
    let outliers = outliers.min(count);
    if outliers == 0 {
        return Vec::new();
    }
    let stride = count / outliers;
    (0..outliers).map(|k| k * stride + stride / 2).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outlier_positions_are_spread() {
        assert_eq!(outlier_positions(100, 2), vec![25, 75]);
        assert_eq!(outlier_positions(10, 0), Vec::<usize>::new());
        assert_eq!(outlier_positions(3, 5), vec![0, 1, 2]);
    }

    #[test]
    fn test_generate_marks_injected_readings() {
        let (readings, injected) = generate(&SyntheticSpec::new(100, 2, 1));
        assert_eq!(readings.len(), 100);
        assert_eq!(injected, vec!["reading-0025", "reading-0075"]);

        let hot = readings[25].value("temperature").unwrap();
        let normal = readings[24].value("temperature").unwrap();
        assert!(hot > 100.0, "scaled temperature {}", hot);
        assert!(normal < 80.0, "normal temperature {}", normal);
    }

    #[test]
    fn test_validate_bounds_count_and_scale() {
        assert!(SyntheticSpec::new(MAX_SYNTHETIC_READINGS, 10, 0).validate().is_ok());

        let err = SyntheticSpec::new(usize::MAX, usize::MAX, 0).validate().unwrap_err();
        assert_eq!(err.kind(), "invalid_parameter");

        let mut spec = SyntheticSpec::new(100, 2, 0);
        spec.scale = f64::INFINITY;
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_generate_is_reproducible() {
        let spec = SyntheticSpec::new(30, 1, 9);
        assert_eq!(generate(&spec).0, generate(&spec).0);
    }

    #[test]
    fn test_readings_are_one_minute_apart() {
        let (readings, _) = generate(&SyntheticSpec::new(3, 0, 0));
        let gap = readings[1].timestamp - readings[0].timestamp;
        assert_eq!(gap.num_seconds(), 60);
    }
}
