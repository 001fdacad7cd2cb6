// Nearest-available-crew selection
use crate::domain::crew::CrewRecord;
use crate::domain::dispatch::DispatchAssignment;
use crate::domain::error::DispatchError;
use crate::domain::geo::haversine_km;
use crate::domain::outage::OutageRecord;

/// Match one outage to the closest available crew.
///
/// Unavailable crews are ignored entirely. Equal distances resolve to the
/// crew listed first. Each call sees the whole pool, so two outages in the
/// same run can receive the same crew.
pub fn assign(
    outage: &OutageRecord,
    pool: &[CrewRecord],
) -> Result<DispatchAssignment, DispatchError> {
    let site = outage.location.validate()?;

    let mut nearest: Option<(&CrewRecord, f64)> = None;
    for crew in pool.iter().filter(|c| c.available) {
        let base = crew.location.validate()?;
        let distance = haversine_km(&site, &base);

        if nearest.map_or(true, |(_, best)| distance < best) {
            nearest = Some((crew, distance));
        }
    }

    let assignment = match nearest {
        Some((crew, distance)) => {
            tracing::debug!(
                "Outage {} -> crew {} ({:.2} km)",
                outage.id,
                crew.id,
                distance
            );
            DispatchAssignment::assigned(outage.id.clone(), site, crew, distance)
        }
        None => {
            tracing::debug!("Outage {} has no available crew", outage.id);
            DispatchAssignment::no_crew_available(outage.id.clone(), site)
        }
    };

    Ok(assignment.with_site_map_link(outage.map_link.clone()))
}
