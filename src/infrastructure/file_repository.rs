// Roster repository backed by exported tabular files (JSON rows keyed by column name)
use crate::application::roster_repository::RosterRepository;
use crate::domain::crew::CrewRecord;
use crate::domain::geo::Coordinate;
use crate::domain::outage::{OutageRecord, OutageStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct JsonRosterRepository {
    outages_path: PathBuf,
    crews_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct OutageRow {
    #[serde(rename = "outage ID")]
    id: String,
    #[serde(rename = "customer name")]
    customer_name: String,
    #[serde(rename = "customer ID")]
    customer_id: Value,
    #[serde(rename = "customer address affected by outage", default)]
    address: String,
    #[serde(rename = "component causing the outage")]
    component: String,
    #[serde(rename = "component ID")]
    component_id: Value,
    #[serde(rename = "Outage Detection Time")]
    detected_at: String,
    #[serde(rename = "outage status")]
    status: String,
    #[serde(rename = "Component Location Latitude")]
    latitude: Value,
    #[serde(rename = "Component Location Longitude")]
    longitude: Value,
    #[serde(rename = "component location Google maps link", default)]
    map_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrewRow {
    #[serde(rename = "Crew ID")]
    id: Value,
    #[serde(rename = "Crew name")]
    name: String,
    #[serde(rename = "Supervisor Assigned")]
    supervisor_name: String,
    #[serde(rename = "Supervisor ID")]
    supervisor_id: Value,
    #[serde(rename = "Location of crew", default)]
    base: String,
    #[serde(rename = "Crew ID available")]
    available: String,
    #[serde(rename = "Location of crew latitude")]
    latitude: Value,
    #[serde(rename = "Location of crew longitude")]
    longitude: Value,
}

impl JsonRosterRepository {
    pub fn new(outages_path: impl Into<PathBuf>, crews_path: impl Into<PathBuf>) -> Self {
        Self {
            outages_path: outages_path.into(),
            crews_path: crews_path.into(),
        }
    }

    async fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

#[async_trait]
impl RosterRepository for JsonRosterRepository {
    async fn list_outages(&self) -> Result<Vec<OutageRecord>> {
        let rows: Vec<OutageRow> = Self::read_rows(&self.outages_path).await?;
        let outages = rows
            .into_iter()
            .map(outage_from_row)
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Loaded {} outages from {}", outages.len(), self.outages_path.display());
        Ok(outages)
    }

    async fn list_crews(&self) -> Result<Vec<CrewRecord>> {
        let rows: Vec<CrewRow> = Self::read_rows(&self.crews_path).await?;
        let crews: Vec<CrewRecord> = rows.into_iter().map(crew_from_row).collect();

        tracing::debug!("Loaded {} crews from {}", crews.len(), self.crews_path.display());
        Ok(crews)
    }
}

fn outage_from_row(row: OutageRow) -> Result<OutageRecord> {
    let status: OutageStatus = row
        .status
        .parse()
        .map_err(|e: String| anyhow::anyhow!("outage {}: {}", row.id, e))?;
    let detected_at = parse_timestamp(&row.detected_at)
        .with_context(|| format!("outage {}: bad detection time '{}'", row.id, row.detected_at))?;

    Ok(OutageRecord {
        customer_id: cell_text(&row.customer_id),
        customer_name: row.customer_name,
        address: row.address,
        component: row.component,
        component_id: cell_text(&row.component_id),
        detected_at,
        status,
        location: Coordinate::new(degrees(&row.latitude), degrees(&row.longitude)),
        map_link: row.map_link,
        id: row.id,
    })
}

fn crew_from_row(row: CrewRow) -> CrewRecord {
    CrewRecord {
        id: cell_text(&row.id),
        name: row.name,
        supervisor_name: row.supervisor_name,
        supervisor_id: cell_text(&row.supervisor_id),
        base: row.base,
        available: row.available.trim().eq_ignore_ascii_case("yes"),
        location: Coordinate::new(degrees(&row.latitude), degrees(&row.longitude)),
    }
}

/// Accepts RFC 3339 or the spreadsheet style `2024-05-01 08:30:00` (taken as UTC)
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))?;
    Ok(naive.and_utc())
}

/// Numeric cell as degrees. Anything non-numeric becomes NaN so the
/// dispatcher rejects that single record instead of the whole file.
fn degrees(cell: &Value) -> f64 {
    match cell {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// Identifier columns may be exported as numbers or strings
fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outage_row(status: &str, lat: Value) -> OutageRow {
        serde_json::from_value(json!({
            "outage ID": "OUT-001",
            "customer name": "Acme Foods",
            "customer ID": 1042,
            "customer address affected by outage": "12 Ring Road",
            "component causing the outage": "Transformer",
            "component ID": "TX-44",
            "Outage Detection Time": "2024-05-01 08:30:00",
            "outage status": status,
            "Component Location Latitude": lat,
            "Component Location Longitude": 77.1
        }))
        .unwrap()
    }

    #[test]
    fn test_outage_row_mapping() {
        let outage = outage_from_row(outage_row("Pending", json!(28.6))).unwrap();
        assert_eq!(outage.id, "OUT-001");
        assert_eq!(outage.customer_id, "1042");
        assert_eq!(outage.status, OutageStatus::Pending);
        assert_eq!(outage.location, Coordinate::new(28.6, 77.1));
        assert_eq!(outage.detected_at.to_rfc3339(), "2024-05-01T08:30:00+00:00");
        assert!(outage.map_link.is_none());
    }

    #[test]
    fn test_map_link_column_is_read() {
        let row: OutageRow = serde_json::from_value(json!({
            "outage ID": "OUT-002",
            "customer name": "Acme Foods",
            "customer ID": "1042",
            "component causing the outage": "Transformer",
            "component ID": "TX-44",
            "Outage Detection Time": "2024-05-01T08:30:00Z",
            "outage status": "Detected",
            "Component Location Latitude": 28.6,
            "Component Location Longitude": 77.1,
            "component location Google maps link": "https://maps.google.com/?q=28.6,77.1"
        }))
        .unwrap();
        let outage = outage_from_row(row).unwrap();
        assert_eq!(outage.map_link.as_deref(), Some("https://maps.google.com/?q=28.6,77.1"));
    }

    #[test]
    fn test_non_numeric_coordinate_becomes_nan() {
        let outage = outage_from_row(outage_row("Detected", json!("north-ish"))).unwrap();
        assert!(outage.location.latitude.is_nan());
        assert!(outage.location.validate().is_err());

        let outage = outage_from_row(outage_row("Detected", json!(" 28.5 "))).unwrap();
        assert_eq!(outage.location.latitude, 28.5);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let err = outage_from_row(outage_row("Escalated", json!(28.6))).unwrap_err();
        assert!(err.to_string().contains("OUT-001"));
    }

    #[test]
    fn test_crew_availability_flag() {
        let row: CrewRow = serde_json::from_value(json!({
            "Crew ID": 7,
            "Crew name": "Line Team Bravo",
            "Supervisor Assigned": "R. Mehta",
            "Supervisor ID": "S-12",
            "Location of crew": "North Yard",
            "Crew ID available": "Yes",
            "Location of crew latitude": "28.7",
            "Location of crew longitude": 77.0
        }))
        .unwrap();
        let crew = crew_from_row(row);
        assert!(crew.available);
        assert_eq!(crew.id, "7");
        assert_eq!(crew.location, Coordinate::new(28.7, 77.0));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-05-01T08:30:00Z").is_ok());
        assert!(parse_timestamp("2024-05-01 08:30").is_ok());
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[tokio::test]
    async fn test_missing_file_has_context() {
        let repo = JsonRosterRepository::new("does/not/exist.json", "nope.json");
        let err = repo.list_outages().await.unwrap_err();
        assert!(err.to_string().contains("does/not/exist.json"));
    }

    #[tokio::test]
    async fn test_loads_sample_roster() {
        let repo = JsonRosterRepository::new("data/outages.json", "data/crews.json");
        let outages = repo.list_outages().await.unwrap();
        let crews = repo.list_crews().await.unwrap();
        assert!(!outages.is_empty());
        assert!(crews.iter().any(|c| c.available));
        assert!(crews.iter().any(|c| !c.available));
    }
}
