// Geographic primitives: coordinates and great-circle distance
use crate::domain::error::DispatchError;
use serde::{Deserialize, Deserializer, Serialize};

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(deserialize_with = "lenient_degrees")]
    pub latitude: f64,
    #[serde(deserialize_with = "lenient_degrees")]
    pub longitude: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DegreesCell {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

/// Numbers and numeric strings are read as degrees. Anything else becomes
/// NaN so `validate` rejects the one record instead of the whole payload.
fn lenient_degrees<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match DegreesCell::deserialize(deserializer)? {
        DegreesCell::Number(value) => value,
        DegreesCell::Text(text) => text.trim().parse().unwrap_or(f64::NAN),
        DegreesCell::Other(_) => f64::NAN,
    })
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Reject non-finite or out-of-range degrees before any distance is computed
    pub fn validate(&self) -> Result<Self, DispatchError> {
        let reason = if !self.latitude.is_finite() || !self.longitude.is_finite() {
            Some("coordinate is not numeric")
        } else if !(-90.0..=90.0).contains(&self.latitude) {
            Some("latitude out of range [-90, 90]")
        } else if !(-180.0..=180.0).contains(&self.longitude) {
            Some("longitude out of range [-180, 180]")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(DispatchError::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
                reason: reason.to_string(),
            }),
            None => Ok(*self),
        }
    }

    /// Point halfway between two coordinates (plain average, fine for map centering)
    pub fn midpoint(&self, other: &Coordinate) -> Coordinate {
        Coordinate::new(
            (self.latitude + other.latitude) / 2.0,
            (self.longitude + other.longitude) / 2.0,
        )
    }
}

/// Great-circle distance in kilometers, rounded to 2 decimal places.
///
/// Callers are expected to have validated both coordinates.
pub fn haversine_km(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (to.longitude - from.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    round2(EARTH_RADIUS_KM * c)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_identity() {
        let p = Coordinate::new(28.6139, 77.2090);
        assert_eq!(haversine_km(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_symmetry() {
        let pairs = [
            (Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)),
            (Coordinate::new(28.6139, 77.2090), Coordinate::new(19.0760, 72.8777)),
            (Coordinate::new(-33.86, 151.21), Coordinate::new(51.5, -0.12)),
            (Coordinate::new(89.9, 179.9), Coordinate::new(-89.9, -179.9)),
        ];
        for (a, b) in pairs {
            assert_eq!(haversine_km(&a, &b), haversine_km(&b, &a));
        }
    }

    #[test]
    fn test_haversine_known_distance() {
        // Delhi to Mumbai is roughly 1150 km
        let delhi = Coordinate::new(28.6139, 77.2090);
        let mumbai = Coordinate::new(19.0760, 72.8777);
        let d = haversine_km(&delhi, &mumbai);
        assert!((d - 1150.0).abs() < 15.0, "got {}", d);
    }

    #[test]
    fn test_haversine_rounds_to_two_decimals() {
        let d = haversine_km(&Coordinate::new(1.0, 1.0), &Coordinate::new(1.01, 1.01));
        assert_eq!(d, 1.57);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(Coordinate::new(90.5, 0.0).validate().is_err());
        assert!(Coordinate::new(0.0, -180.5).validate().is_err());
        assert!(Coordinate::new(-90.0, 180.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_numeric() {
        let err = Coordinate::new(f64::NAN, 10.0).validate().unwrap_err();
        match err {
            DispatchError::InvalidCoordinate { reason, .. } => {
                assert_eq!(reason, "coordinate is not numeric")
            }
        }
        assert!(Coordinate::new(10.0, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_deserialize_accepts_numeric_strings() {
        let c: Coordinate =
            serde_json::from_value(serde_json::json!({ "latitude": " 28.5 ", "longitude": 77 })).unwrap();
        assert_eq!(c, Coordinate::new(28.5, 77.0));
    }

    #[test]
    fn test_deserialize_non_numeric_becomes_invalid() {
        let c: Coordinate =
            serde_json::from_value(serde_json::json!({ "latitude": "abc", "longitude": null })).unwrap();
        assert!(c.latitude.is_nan() && c.longitude.is_nan());
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_midpoint() {
        let m = Coordinate::new(1.0, 2.0).midpoint(&Coordinate::new(3.0, 4.0));
        assert_eq!(m, Coordinate::new(2.0, 3.0));
    }
}
