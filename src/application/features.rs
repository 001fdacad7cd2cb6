// Feature matrix extraction for the outlier model
use crate::domain::error::DetectorError;
use crate::domain::telemetry::{FeatureSet, TelemetryReading};

/// Row-major matrix, one row per reading, columns in `FeatureSet` order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    rows: Vec<Vec<f64>>,
    width: usize,
}

impl FeatureMatrix {
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, DetectorError> {
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some(bad) = rows.iter().position(|r| r.len() != width) {
            return Err(DetectorError::invalid_parameter(
                "rows",
                format!("row {} has {} columns, expected {}", bad, rows[bad].len(), width),
            ));
        }
        Ok(Self { rows, width })
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> &[f64] {
        &self.rows[index]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

pub fn extract(batch: &[TelemetryReading], features: &FeatureSet) -> Result<FeatureMatrix, DetectorError> {
    if features.is_empty() {
        return Err(DetectorError::invalid_parameter(
            "features",
            "at least one feature is required",
        ));
    }

    let mut rows = Vec::with_capacity(batch.len());
    for reading in batch {
        let mut row = Vec::with_capacity(features.len());
        for name in features.names() {
            let value = reading
                .value(name)
                .ok_or_else(|| DetectorError::MissingFeature {
                    reading_id: reading.id.clone(),
                    feature: name.clone(),
                })?;
            if !value.is_finite() {
                return Err(DetectorError::ModelFitFailure(format!(
                    "reading {} has non-finite {}",
                    reading.id, name
                )));
            }
            row.push(value);
        }
        rows.push(row);
    }

    FeatureMatrix::from_rows(rows)
}
