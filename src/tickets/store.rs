use super::models::{SupportTicket, TicketStatus};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// Data-access collaborator for support tickets.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// All tickets currently in the given status.
    async fn tickets_with_status(&self, status: TicketStatus) -> Result<Vec<SupportTicket>>;

    /// Transition a ticket to `Closed`.
    async fn close_ticket(&self, ticket_id: &str) -> Result<()>;
}

/// In-memory store used by tests and standalone runs.
#[derive(Default)]
pub struct MemoryTicketStore {
    tickets: RwLock<HashMap<String, SupportTicket>>,
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_ticket(&self, ticket: SupportTicket) {
        self.tickets
            .write()
            .unwrap()
            .insert(ticket.id.clone(), ticket);
    }

    pub fn ticket(&self, ticket_id: &str) -> Option<SupportTicket> {
        self.tickets.read().unwrap().get(ticket_id).cloned()
    }
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn tickets_with_status(&self, status: TicketStatus) -> Result<Vec<SupportTicket>> {
        Ok(self
            .tickets
            .read()
            .unwrap()
            .values()
            .filter(|ticket| ticket.status == status)
            .cloned()
            .collect())
    }

    async fn close_ticket(&self, ticket_id: &str) -> Result<()> {
        let mut tickets = self.tickets.write().unwrap();
        match tickets.get_mut(ticket_id) {
            Some(ticket) => {
                ticket.status = TicketStatus::Closed;
                Ok(())
            }
            None => bail!("unknown ticket: {}", ticket_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ticket(id: &str, status: TicketStatus) -> SupportTicket {
        SupportTicket {
            id: id.to_string(),
            status,
            resolved_at: Some(Utc::now()),
            last_patient_response_at: None,
        }
    }

    #[tokio::test]
    async fn test_status_query_filters() {
        let store = MemoryTicketStore::new();
        store.insert_ticket(ticket("t1", TicketStatus::Resolved));
        store.insert_ticket(ticket("t2", TicketStatus::Open));

        let resolved = store
            .tickets_with_status(TicketStatus::Resolved)
            .await
            .unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, "t1");
    }

    #[tokio::test]
    async fn test_close_ticket() {
        let store = MemoryTicketStore::new();
        store.insert_ticket(ticket("t1", TicketStatus::Resolved));

        store.close_ticket("t1").await.unwrap();
        assert_eq!(store.ticket("t1").unwrap().status, TicketStatus::Closed);

        assert!(store.close_ticket("missing").await.is_err());
    }
}
