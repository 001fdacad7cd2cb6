// Field crew domain model
use crate::domain::geo::Coordinate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewRecord {
    pub id: String,
    pub name: String,
    pub supervisor_name: String,
    pub supervisor_id: String,
    /// Human readable base, e.g. "Dwarka Depot"
    #[serde(default)]
    pub base: String,
    pub available: bool,
    pub location: Coordinate,
}
