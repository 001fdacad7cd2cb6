// Dispatch service - Use cases for assigning crews to active outages
use crate::application::dispatcher::assign;
use crate::application::roster_repository::RosterRepository;
use crate::domain::crew::CrewRecord;
use crate::domain::dispatch::DispatchAssignment;
use crate::domain::outage::OutageRecord;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

const EVENT_BUFFER: usize = 100;

/// A successful assignment (including the no-crew sentinel) with its service id
#[derive(Debug, Clone, Serialize)]
pub struct DispatchTicket {
    pub service_id: String,
    pub assignment: DispatchAssignment,
}

/// An outage that could not be assigned; its siblings are unaffected
#[derive(Debug, Clone, Serialize)]
pub struct DispatchFailure {
    pub outage_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchReport {
    pub tickets: Vec<DispatchTicket>,
    pub failures: Vec<DispatchFailure>,
}

impl DispatchReport {
    pub fn manual_assignments(&self) -> usize {
        self.tickets
            .iter()
            .filter(|t| t.assignment.requires_manual_assignment())
            .count()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DispatchEvent {
    Ticket(DispatchTicket),
    Failure(DispatchFailure),
    Complete {
        total: usize,
        failed: usize,
        duration_ms: i64,
    },
}

#[derive(Clone)]
pub struct DispatchService {
    repository: Arc<dyn RosterRepository>,
}

impl DispatchService {
    pub fn new(repository: Arc<dyn RosterRepository>) -> Self {
        Self { repository }
    }

    /// Assign every active outage in the roster, in roster order
    pub async fn dispatch_active(&self) -> anyhow::Result<DispatchReport> {
        let outages = self.repository.list_outages().await?;
        let crews = self.repository.list_crews().await?;
        Ok(dispatch_batch(&outages, &crews))
    }

    /// Assign every active outage concurrently, emitting results as they finish
    pub async fn stream_active(&self) -> anyhow::Result<mpsc::Receiver<DispatchEvent>> {
        let outages = self.repository.list_outages().await?;
        let crews: Arc<[CrewRecord]> = self.repository.list_crews().await?.into();

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let start_time = Instant::now();
        let active: Vec<OutageRecord> = outages.into_iter().filter(|o| o.is_dispatchable()).collect();
        let total = active.len();

        tracing::info!(
            "Streaming dispatch for {} active outages against {} crews",
            total,
            crews.len()
        );

        let mut tasks = JoinSet::new();
        for outage in active {
            let tx = tx.clone();
            let crews = crews.clone();

            tasks.spawn(async move {
                let (event, failed) = match resolve(&outage, &crews) {
                    Ok(ticket) => (DispatchEvent::Ticket(ticket), false),
                    Err(failure) => (DispatchEvent::Failure(failure), true),
                };
                let _ = tx.send(event).await;
                failed
            });
        }

        tokio::spawn(async move {
            let mut failed = 0;
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(true) => failed += 1,
                    Ok(false) => {}
                    Err(e) => {
                        tracing::error!("Dispatch task aborted: {}", e);
                        failed += 1;
                    }
                }
            }

            let duration_ms = start_time.elapsed().as_millis() as i64;
            let _ = tx
                .send(DispatchEvent::Complete {
                    total,
                    failed,
                    duration_ms,
                })
                .await;
        });

        Ok(rx)
    }
}

/// Assign each dispatchable outage independently against the same crew pool.
///
/// Outages that are already dispatched or resolved are skipped.
pub fn dispatch_batch(outages: &[OutageRecord], crews: &[CrewRecord]) -> DispatchReport {
    let mut report = DispatchReport::default();

    for outage in outages.iter().filter(|o| o.is_dispatchable()) {
        match resolve(outage, crews) {
            Ok(ticket) => report.tickets.push(ticket),
            Err(failure) => report.failures.push(failure),
        }
    }

    tracing::info!(
        "Dispatched {} outages ({} need manual assignment, {} failed)",
        report.tickets.len(),
        report.manual_assignments(),
        report.failures.len()
    );

    report
}

fn resolve(outage: &OutageRecord, crews: &[CrewRecord]) -> Result<DispatchTicket, DispatchFailure> {
    match assign(outage, crews) {
        Ok(assignment) => {
            if assignment.requires_manual_assignment() {
                tracing::warn!("No available crew found for outage {}", outage.id);
            }
            Ok(DispatchTicket {
                service_id: generate_service_id(),
                assignment,
            })
        }
        Err(e) => {
            tracing::warn!("Skipping outage {}: {}", outage.id, e);
            Err(DispatchFailure {
                outage_id: outage.id.clone(),
                error: e.to_string(),
            })
        }
    }
}

/// Service ids look like `SVC-1A2B3C4D`
pub fn generate_service_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("SVC-{}", hex[..8].to_ascii_uppercase())
}
