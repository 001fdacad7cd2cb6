// InfluxDB telemetry source
use crate::application::roster_repository::TelemetrySource;
use crate::domain::telemetry::{FeatureSet, TelemetryReading};
use crate::infrastructure::config::{prepare_query, InfluxSettings};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
pub struct InfluxTelemetrySource {
    client: reqwest::Client,
    host: String,
    token: String,
    database: String,
    retention_policy: String,
    query_template: String,
    features: FeatureSet,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    columns: Vec<String>,
    values: Vec<Vec<serde_json::Value>>,
}

impl InfluxTelemetrySource {
    pub fn new(settings: InfluxSettings, features: FeatureSet) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: settings.host.trim_end_matches('/').to_string(),
            token: settings.token,
            database: settings.database,
            retention_policy: settings.retention_policy,
            query_template: settings.query,
            features,
        }
    }

    fn render_query(&self, source: &str, hours: i32) -> String {
        let mut vars = HashMap::new();
        vars.insert("source".to_string(), escape_string_literal(source));
        vars.insert("hours".to_string(), hours.to_string());
        prepare_query(&self.query_template, &vars)
    }

    fn build_query_url(&self, query: &str) -> String {
        format!(
            "{}/query?db={}&rp={}&q={}",
            self.host,
            self.database,
            self.retention_policy,
            urlencoding::encode(query)
        )
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse> {
        let url = self.build_query_url(query);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB query failed with status {}: {}", status, body);
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .context("Failed to parse InfluxDB response")?;

        if let Some(error) = data.results.first().and_then(|r| r.error.as_ref()) {
            anyhow::bail!("InfluxDB query error: {}", error);
        }

        Ok(data)
    }

    /// Turn result rows into readings; rows missing a feature are skipped
    fn readings_from_response(&self, source: &str, response: InfluxQLResponse) -> Vec<TelemetryReading> {
        let mut readings = Vec::new();

        let series = response
            .results
            .into_iter()
            .flat_map(|r| r.series.unwrap_or_default());

        for s in series {
            let time_idx = s.columns.iter().position(|c| c == "time").unwrap_or(0);
            let feature_idx: Vec<(&String, Option<usize>)> = self
                .features
                .names()
                .iter()
                .map(|name| (name, s.columns.iter().position(|c| c == name)))
                .collect();

            for row in &s.values {
                let Some(time) = row
                    .get(time_idx)
                    .and_then(|v| v.as_str())
                    .and_then(|t| chrono::DateTime::parse_from_rfc3339(t).ok())
                else {
                    continue;
                };

                let values: BTreeMap<String, f64> = feature_idx
                    .iter()
                    .filter_map(|(name, idx)| {
                        let value = row.get((*idx)?)?.as_f64()?;
                        Some(((*name).clone(), value))
                    })
                    .collect();

                if values.len() != feature_idx.len() {
                    tracing::warn!("Skipping {} row at {}: incomplete features", source, time);
                    continue;
                }

                readings.push(TelemetryReading::new(
                    format!("{}@{}", source, time.timestamp_millis()),
                    time.with_timezone(&chrono::Utc),
                    values,
                ));
            }
        }

        readings
    }
}

/// Escape a value substituted inside a single-quoted InfluxQL literal
fn escape_string_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[async_trait]
impl TelemetrySource for InfluxTelemetrySource {
    async fn fetch_readings(&self, source: &str, hours: i32) -> Result<Vec<TelemetryReading>> {
        let query = self.render_query(source, hours);

        tracing::debug!("Executing telemetry query: {}", query);
        let response = self.execute_query(&query).await?;
        let readings = self.readings_from_response(source, response);

        tracing::debug!("Fetched {} readings for {}", readings.len(), source);
        Ok(readings)
    }
}
