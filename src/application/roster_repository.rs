// Collaborator traits for roster ingestion and telemetry feeds
use crate::domain::crew::CrewRecord;
use crate::domain::outage::OutageRecord;
use crate::domain::telemetry::TelemetryReading;
use async_trait::async_trait;

#[async_trait]
pub trait RosterRepository: Send + Sync {
    /// All reported outages, regardless of status
    async fn list_outages(&self) -> anyhow::Result<Vec<OutageRecord>>;

    /// The full crew roster, available or not
    async fn list_crews(&self) -> anyhow::Result<Vec<CrewRecord>>;
}

#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Readings recorded by `source` over the last `hours`
    async fn fetch_readings(&self, source: &str, hours: i32) -> anyhow::Result<Vec<TelemetryReading>>;
}
