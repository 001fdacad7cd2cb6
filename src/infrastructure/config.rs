use crate::application::detector::{
    DetectorParams, DEFAULT_CONTAMINATION, DEFAULT_MAX_SAMPLES, DEFAULT_SEED, DEFAULT_TREES,
};
use crate::domain::telemetry::FeatureSet;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub roster: RosterSettings,
    #[serde(default)]
    pub detector: DetectorSettings,
    #[serde(default)]
    pub influx: InfluxSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_addr")]
    pub addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { addr: default_addr() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RosterSettings {
    #[serde(default = "default_outages_path")]
    pub outages_path: String,
    #[serde(default = "default_crews_path")]
    pub crews_path: String,
}

impl Default for RosterSettings {
    fn default() -> Self {
        Self {
            outages_path: default_outages_path(),
            crews_path: default_crews_path(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DetectorSettings {
    #[serde(default = "default_contamination")]
    pub contamination: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_trees")]
    pub n_trees: usize,
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
    #[serde(default)]
    pub features: FeatureSet,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            contamination: default_contamination(),
            seed: default_seed(),
            n_trees: default_trees(),
            max_samples: default_max_samples(),
            features: FeatureSet::default(),
        }
    }
}

impl From<DetectorSettings> for DetectorParams {
    fn from(settings: DetectorSettings) -> Self {
        Self {
            contamination: settings.contamination,
            seed: settings.seed,
            n_trees: settings.n_trees,
            max_samples: settings.max_samples,
            features: settings.features,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    #[serde(default = "default_influx_host")]
    pub host: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_influx_database")]
    pub database: String,
    #[serde(default = "default_retention_policy")]
    pub retention_policy: String,
    /// Query template; `${source}` and `${hours}` are substituted per request
    #[serde(default = "default_influx_query")]
    pub query: String,
}

impl Default for InfluxSettings {
    fn default() -> Self {
        Self {
            host: default_influx_host(),
            token: String::new(),
            database: default_influx_database(),
            retention_policy: default_retention_policy(),
            query: default_influx_query(),
        }
    }
}

fn default_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_outages_path() -> String {
    "data/outages.json".to_string()
}

fn default_crews_path() -> String {
    "data/crews.json".to_string()
}

fn default_contamination() -> f64 {
    DEFAULT_CONTAMINATION
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_trees() -> usize {
    DEFAULT_TREES
}

fn default_max_samples() -> usize {
    DEFAULT_MAX_SAMPLES
}

fn default_influx_host() -> String {
    "http://localhost:8086".to_string()
}

fn default_influx_database() -> String {
    "telemetry".to_string()
}

fn default_retention_policy() -> String {
    "autogen".to_string()
}

fn default_influx_query() -> String {
    "SELECT temperature, pressure, vibration FROM sensor_readings WHERE host='${source}' AND time >= now() - ${hours}h".to_string()
}

/// Load `config/outage.toml` (optional), then apply `OUTAGE__SECTION__KEY` overrides
pub fn load_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/outage").required(false))
        .add_source(
            config::Environment::with_prefix("OUTAGE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("detector.features"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace template variables in a query string
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
