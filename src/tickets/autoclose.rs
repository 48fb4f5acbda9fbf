//! Automatic closure of stale resolved tickets.
//!
//! A resolved ticket with no patient activity for more than the
//! inactivity threshold transitions to closed, with an audit entry per
//! closure. Any activity inside the window keeps the ticket open.

use super::models::{SupportTicket, TicketStatus};
use super::store::TicketStore;
use crate::audit::{AuditEntry, AuditLog};
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Days a resolved ticket may sit without patient activity before it is
/// closed automatically.
const INACTIVITY_DAYS: i64 = 3;

/// Per-run counts for the ticket auto-close engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AutoCloseSummary {
    /// Tickets transitioned to closed on this run.
    pub closed: usize,
    /// Resolved tickets left untouched: still active inside the window,
    /// or a per-ticket failure.
    pub skipped: usize,
}

/// Closes resolved support tickets once the patient has been inactive
/// past the threshold.
pub struct TicketAutoCloseService {
    store: Arc<dyn TicketStore>,
    audit_log: Arc<dyn AuditLog>,
}

impl TicketAutoCloseService {
    pub fn new(store: Arc<dyn TicketStore>, audit_log: Arc<dyn AuditLog>) -> Self {
        Self { store, audit_log }
    }

    pub async fn check_and_close_resolved_tickets(&self) -> Result<AutoCloseSummary> {
        self.close_at(Utc::now()).await
    }

    async fn close_at(&self, now: DateTime<Utc>) -> Result<AutoCloseSummary> {
        let threshold = Duration::days(INACTIVITY_DAYS);
        let tickets = self.store.tickets_with_status(TicketStatus::Resolved).await?;

        let mut summary = AutoCloseSummary::default();
        for ticket in &tickets {
            let Some(last_activity) = ticket.last_activity_at() else {
                warn!(
                    "Resolved ticket {} has no resolution timestamp, leaving untouched",
                    ticket.id
                );
                summary.skipped += 1;
                continue;
            };
            // "After three days" is exclusive: activity exactly at the
            // boundary keeps the ticket open.
            if now - last_activity <= threshold {
                summary.skipped += 1;
                continue;
            }

            match self.close_ticket(ticket, now).await {
                Ok(()) => summary.closed += 1,
                Err(e) => {
                    warn!("Failed to auto-close ticket {}: {:#}", ticket.id, e);
                    summary.skipped += 1;
                }
            }
        }

        info!(
            "Ticket auto-close: {} closed, {} skipped",
            summary.closed, summary.skipped
        );
        Ok(summary)
    }

    async fn close_ticket(&self, ticket: &SupportTicket, now: DateTime<Utc>) -> Result<()> {
        self.store.close_ticket(&ticket.id).await?;

        let entry = AuditEntry {
            at: now,
            action: "ticket_auto_closed".to_string(),
            subject: ticket.id.clone(),
            details: Some(serde_json::json!({
                "inactivity_days": INACTIVITY_DAYS,
                "last_activity_at": ticket.last_activity_at().map(|at| at.to_rfc3339()),
            })),
        };
        if let Err(e) = self.audit_log.append(entry).await {
            warn!("Ticket {} closed but the audit entry failed: {:#}", ticket.id, e);
        }
        Ok(())
    }
}
