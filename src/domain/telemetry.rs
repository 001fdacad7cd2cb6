// Telemetry data domain models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_FEATURES: [&str; 3] = ["temperature", "pressure", "vibration"];

/// One timestamped sensor sample with named numeric dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReading {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub values: BTreeMap<String, f64>,
}

impl TelemetryReading {
    pub fn new(id: String, timestamp: DateTime<Utc>, values: BTreeMap<String, f64>) -> Self {
        Self {
            id,
            timestamp,
            values,
        }
    }

    pub fn value(&self, feature: &str) -> Option<f64> {
        self.values.get(feature).copied()
    }
}

/// Ordered list of dimensions fed to the outlier model.
///
/// Order matters: rows are built column by column in this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet(Vec<String>);

impl FeatureSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self::new(DEFAULT_FEATURES)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedReading {
    pub reading: TelemetryReading,
    /// Isolation score in (0, 1]; higher is more anomalous
    pub score: f64,
    pub is_anomaly: bool,
}

/// Readings of one batch that the detector judged anomalous, in batch order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalySet {
    pub batch_size: usize,
    pub contamination: f64,
    pub threshold: f64,
    pub anomalies: Vec<FlaggedReading>,
}

impl AnomalySet {
    pub fn len(&self) -> usize {
        self.anomalies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anomalies.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.anomalies.iter().map(|a| a.reading.id.as_str()).collect()
    }
}
