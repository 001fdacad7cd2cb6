// Outage domain model
use crate::domain::geo::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutageStatus {
    Detected,
    Pending,
    Dispatched,
    Resolved,
}

impl OutageStatus {
    /// Only freshly detected or pending outages are sent a crew
    pub fn is_dispatchable(&self) -> bool {
        matches!(self, OutageStatus::Detected | OutageStatus::Pending)
    }
}

impl fmt::Display for OutageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutageStatus::Detected => "Detected",
            OutageStatus::Pending => "Pending",
            OutageStatus::Dispatched => "Dispatched",
            OutageStatus::Resolved => "Resolved",
        };
        f.write_str(s)
    }
}

impl FromStr for OutageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detected" => Ok(OutageStatus::Detected),
            "pending" => Ok(OutageStatus::Pending),
            "dispatched" => Ok(OutageStatus::Dispatched),
            "resolved" => Ok(OutageStatus::Resolved),
            other => Err(format!("unknown outage status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutageRecord {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    #[serde(default)]
    pub address: String,
    pub component: String,
    pub component_id: String,
    pub detected_at: DateTime<Utc>,
    pub status: OutageStatus,
    pub location: Coordinate,
    /// Published map link for the component site, if the roster has one
    #[serde(default)]
    pub map_link: Option<String>,
}

impl OutageRecord {
    pub fn is_dispatchable(&self) -> bool {
        self.status.is_dispatchable()
    }
}
