use super::models::{CheckoutSession, RecoveryTrigger};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

/// Data-access collaborator for the checkout domain.
///
/// The commerce platform implements this against its own storage; the
/// dedup check in the recovery engine assumes at least read-your-writes
/// consistency for trigger records.
#[async_trait]
pub trait CheckoutStore: Send + Sync {
    /// Sessions with a checkout-started event at or after `cutoff` that
    /// carry identifying contact information.
    async fn sessions_started_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<CheckoutSession>>;

    /// The recovery trigger recorded for a session, if any.
    async fn recovery_trigger(&self, session_key: &str) -> Result<Option<RecoveryTrigger>>;

    /// Durably record that a recovery message was dispatched.
    async fn record_recovery_trigger(&self, trigger: RecoveryTrigger) -> Result<()>;
}

/// In-memory store used by tests and standalone runs.
#[derive(Default)]
pub struct MemoryCheckoutStore {
    sessions: RwLock<Vec<CheckoutSession>>,
    triggers: RwLock<HashMap<String, RecoveryTrigger>>,
}

impl MemoryCheckoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_session(&self, session: CheckoutSession) {
        self.sessions.write().unwrap().push(session);
    }

    pub fn trigger_count(&self) -> usize {
        self.triggers.read().unwrap().len()
    }
}

#[async_trait]
impl CheckoutStore for MemoryCheckoutStore {
    async fn sessions_started_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<CheckoutSession>> {
        Ok(self
            .sessions
            .read()
            .unwrap()
            .iter()
            .filter(|session| session.started_at >= cutoff && !session.contact.is_empty())
            .cloned()
            .collect())
    }

    async fn recovery_trigger(&self, session_key: &str) -> Result<Option<RecoveryTrigger>> {
        Ok(self.triggers.read().unwrap().get(session_key).cloned())
    }

    async fn record_recovery_trigger(&self, trigger: RecoveryTrigger) -> Result<()> {
        self.triggers
            .write()
            .unwrap()
            .insert(trigger.session_key.clone(), trigger);
        Ok(())
    }
}
