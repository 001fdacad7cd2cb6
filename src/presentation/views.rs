// Response shapes handed to notification consumers
use crate::application::dispatch_service::{
    DispatchEvent, DispatchFailure, DispatchReport, DispatchTicket,
};
use crate::domain::dispatch::DispatchAssignment;
use crate::infrastructure::map_links::{route_links, RouteLinks};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TicketView {
    pub service_id: String,
    pub assignment: DispatchAssignment,
    pub summary: String,
    pub links: RouteLinks,
}

impl From<DispatchTicket> for TicketView {
    fn from(ticket: DispatchTicket) -> Self {
        Self {
            summary: ticket.assignment.summary(),
            links: route_links(&ticket.assignment),
            service_id: ticket.service_id,
            assignment: ticket.assignment,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchReportView {
    pub tickets: Vec<TicketView>,
    pub failures: Vec<DispatchFailure>,
    pub manual_assignments: usize,
}

impl From<DispatchReport> for DispatchReportView {
    fn from(report: DispatchReport) -> Self {
        Self {
            manual_assignments: report.manual_assignments(),
            tickets: report.tickets.into_iter().map(TicketView::from).collect(),
            failures: report.failures,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DispatchEventView {
    Ticket(TicketView),
    Failure(DispatchFailure),
    Complete {
        total: usize,
        failed: usize,
        duration_ms: i64,
    },
}

impl From<DispatchEvent> for DispatchEventView {
    fn from(event: DispatchEvent) -> Self {
        match event {
            DispatchEvent::Ticket(ticket) => DispatchEventView::Ticket(ticket.into()),
            DispatchEvent::Failure(failure) => DispatchEventView::Failure(failure),
            DispatchEvent::Complete {
                total,
                failed,
                duration_ms,
            } => DispatchEventView::Complete {
                total,
                failed,
                duration_ms,
            },
        }
    }
}
