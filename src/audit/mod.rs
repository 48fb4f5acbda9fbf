//! Audit collaborator.
//!
//! The platform persists audit entries centrally; this subsystem appends
//! through a seam so closures and other state transitions stay traceable.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use std::sync::Mutex;

/// A single audit record appended by this subsystem.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub at: DateTime<Utc>,
    /// Machine-readable action, e.g. "ticket_auto_closed".
    pub action: String,
    /// Identifier of the affected entity.
    pub subject: String,
    pub details: Option<JsonValue>,
}

/// Append-only audit sink.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, entry: AuditEntry) -> Result<()>;
}

/// In-memory audit log used by tests and standalone runs.
#[derive(Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl AuditLog for MemoryAuditLog {
    async fn append(&self, entry: AuditEntry) -> Result<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_and_read_back() {
        let log = MemoryAuditLog::new();
        assert!(log.is_empty());

        log.append(AuditEntry {
            at: Utc::now(),
            action: "ticket_auto_closed".to_string(),
            subject: "t1".to_string(),
            details: None,
        })
        .await
        .unwrap();

        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].subject, "t1");
    }
}
