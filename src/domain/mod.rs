// Domain layer - Records, results and the geometry they rely on
pub mod crew;
pub mod dispatch;
pub mod error;
pub mod geo;
pub mod outage;
pub mod telemetry;
