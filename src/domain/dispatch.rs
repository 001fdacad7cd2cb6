// Dispatch assignment domain model
use crate::domain::crew::CrewRecord;
use crate::domain::geo::Coordinate;
use serde::{Deserialize, Serialize};

/// Minutes of travel assumed per straight-line kilometer (30 km/h)
pub const ETA_MINUTES_PER_KM: f64 = 2.0;

pub const NO_CREW_SUMMARY: &str = "No available crew for dispatch - Manual assignment required";

/// Snapshot of the crew chosen for an outage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedCrew {
    pub id: String,
    pub name: String,
    pub supervisor_name: String,
    pub supervisor_id: String,
    pub base: String,
    pub location: Coordinate,
}

impl From<&CrewRecord> for AssignedCrew {
    fn from(crew: &CrewRecord) -> Self {
        Self {
            id: crew.id.clone(),
            name: crew.name.clone(),
            supervisor_name: crew.supervisor_name.clone(),
            supervisor_id: crew.supervisor_id.clone(),
            base: crew.base.clone(),
            location: crew.location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Assigned {
        crew: AssignedCrew,
        distance_km: f64,
        eta_minutes: u32,
    },
    /// No crew was available; manual assignment is required downstream
    NoCrewAvailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchAssignment {
    pub outage_id: String,
    pub outage_location: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_map_link: Option<String>,
    pub outcome: DispatchOutcome,
}

impl DispatchAssignment {
    pub fn assigned(
        outage_id: String,
        outage_location: Coordinate,
        crew: &CrewRecord,
        distance_km: f64,
    ) -> Self {
        Self {
            outage_id,
            outage_location,
            site_map_link: None,
            outcome: DispatchOutcome::Assigned {
                crew: AssignedCrew::from(crew),
                distance_km: distance_km.max(0.0),
                eta_minutes: eta_minutes(distance_km),
            },
        }
    }

    pub fn no_crew_available(outage_id: String, outage_location: Coordinate) -> Self {
        Self {
            outage_id,
            outage_location,
            site_map_link: None,
            outcome: DispatchOutcome::NoCrewAvailable,
        }
    }

    pub fn with_site_map_link(mut self, link: Option<String>) -> Self {
        self.site_map_link = link.filter(|l| !l.trim().is_empty());
        self
    }

    pub fn crew(&self) -> Option<&AssignedCrew> {
        match &self.outcome {
            DispatchOutcome::Assigned { crew, .. } => Some(crew),
            DispatchOutcome::NoCrewAvailable => None,
        }
    }

    pub fn distance_km(&self) -> Option<f64> {
        match self.outcome {
            DispatchOutcome::Assigned { distance_km, .. } => Some(distance_km),
            DispatchOutcome::NoCrewAvailable => None,
        }
    }

    pub fn eta_minutes(&self) -> Option<u32> {
        match self.outcome {
            DispatchOutcome::Assigned { eta_minutes, .. } => Some(eta_minutes),
            DispatchOutcome::NoCrewAvailable => None,
        }
    }

    pub fn requires_manual_assignment(&self) -> bool {
        matches!(self.outcome, DispatchOutcome::NoCrewAvailable)
    }

    /// Crew assignment block embedded in alerts and reports
    pub fn summary(&self) -> String {
        match &self.outcome {
            DispatchOutcome::Assigned {
                crew,
                distance_km,
                eta_minutes,
            } => format!(
                "Crew Name: {}\nCrew ID: {}\nSupervisor: {} (ID: {})\nCrew Location: {}\nDistance to site: {:.2} km\nETA: {} minutes",
                crew.name,
                crew.id,
                crew.supervisor_name,
                crew.supervisor_id,
                crew.base,
                distance_km,
                eta_minutes
            ),
            DispatchOutcome::NoCrewAvailable => NO_CREW_SUMMARY.to_string(),
        }
    }
}

/// Heuristic travel time from straight-line distance; not a routed estimate
pub fn eta_minutes(distance_km: f64) -> u32 {
    (distance_km.max(0.0) * ETA_MINUTES_PER_KM).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crew() -> CrewRecord {
        CrewRecord {
            id: "C-7".to_string(),
            name: "Line Team Bravo".to_string(),
            supervisor_name: "R. Mehta".to_string(),
            supervisor_id: "S-12".to_string(),
            base: "North Yard".to_string(),
            available: true,
            location: Coordinate::new(1.0, 1.0),
        }
    }

    #[test]
    fn test_eta_minutes() {
        assert_eq!(eta_minutes(0.0), 0);
        assert_eq!(eta_minutes(1.57), 3);
        assert_eq!(eta_minutes(12.2), 24);
    }

    #[test]
    fn test_assigned_accessors() {
        let a = DispatchAssignment::assigned("O-1".to_string(), Coordinate::new(1.01, 1.01), &crew(), 1.57);
        assert_eq!(a.crew().map(|c| c.id.as_str()), Some("C-7"));
        assert_eq!(a.distance_km(), Some(1.57));
        assert_eq!(a.eta_minutes(), Some(3));
        assert!(!a.requires_manual_assignment());
    }

    #[test]
    fn test_sentinel_has_no_crew_or_distance() {
        let a = DispatchAssignment::no_crew_available("O-2".to_string(), Coordinate::new(0.0, 0.0));
        assert!(a.crew().is_none());
        assert!(a.distance_km().is_none());
        assert!(a.eta_minutes().is_none());
        assert!(a.requires_manual_assignment());
        assert_eq!(a.summary(), NO_CREW_SUMMARY);
    }

    #[test]
    fn test_summary_lists_crew_details() {
        let a = DispatchAssignment::assigned("O-1".to_string(), Coordinate::new(1.01, 1.01), &crew(), 1.5);
        let summary = a.summary();
        assert!(summary.contains("Crew Name: Line Team Bravo"));
        assert!(summary.contains("Supervisor: R. Mehta (ID: S-12)"));
        assert!(summary.contains("Distance to site: 1.50 km"));
        assert!(summary.ends_with("ETA: 3 minutes"));
    }

    #[test]
    fn test_blank_site_map_link_is_dropped() {
        let a = DispatchAssignment::no_crew_available("O-2".to_string(), Coordinate::new(0.0, 0.0))
            .with_site_map_link(Some("  ".to_string()));
        assert!(a.site_map_link.is_none());
    }

    #[test]
    fn test_outcome_serializes_with_kind_tag() {
        let a = DispatchAssignment::no_crew_available("O-2".to_string(), Coordinate::new(0.0, 0.0));
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["outcome"]["kind"], "no_crew_available");
    }
}
