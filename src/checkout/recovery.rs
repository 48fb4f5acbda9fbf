//! Abandoned-checkout detection.
//!
//! A session counts as abandoned when it has a start event inside the
//! lookback window, no completed purchase, and its most recent checkout
//! event is older than the grace threshold. Detection reads and decides;
//! the action (recovery message plus trigger record) happens at most
//! once per session, ever.

use super::models::{CheckoutSession, RecoveryTrigger};
use super::store::CheckoutStore;
use crate::messaging::RecoveryMessenger;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Per-run counts for the abandoned-checkout engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecoveryRunSummary {
    /// Sessions returned by the lookback query.
    pub scanned: usize,
    /// Sessions a recovery message was dispatched for on this run.
    pub triggered: usize,
    /// Abandoned sessions suppressed by an existing trigger record or a
    /// per-session failure.
    pub skipped: usize,
}

/// Finds checkout sessions matching the abandonment criteria and
/// dispatches a recovery message at most once per session.
pub struct AbandonedCheckoutService {
    store: Arc<dyn CheckoutStore>,
    messenger: Arc<dyn RecoveryMessenger>,
}

impl AbandonedCheckoutService {
    pub fn new(store: Arc<dyn CheckoutStore>, messenger: Arc<dyn RecoveryMessenger>) -> Self {
        Self { store, messenger }
    }

    /// Scan sessions started within the last `lookback_hours` and
    /// trigger recovery for those idle longer than `threshold_hours`.
    pub async fn process_abandoned_sessions(
        &self,
        lookback_hours: u64,
        threshold_hours: u64,
    ) -> Result<RecoveryRunSummary> {
        self.process_at(Utc::now(), lookback_hours, threshold_hours)
            .await
    }

    async fn process_at(
        &self,
        now: DateTime<Utc>,
        lookback_hours: u64,
        threshold_hours: u64,
    ) -> Result<RecoveryRunSummary> {
        let cutoff = now - Duration::hours(lookback_hours as i64);
        let threshold = Duration::hours(threshold_hours as i64);
        let sessions = self.store.sessions_started_since(cutoff).await?;

        let mut summary = RecoveryRunSummary {
            scanned: sessions.len(),
            ..Default::default()
        };

        for session in &sessions {
            if session.completed_at.is_some() {
                // Purchased, not abandoned.
                continue;
            }
            // Grace window: only act once the last event is strictly
            // older than the threshold.
            if now - session.last_event_at <= threshold {
                continue;
            }

            match self.process_session(session, now).await {
                Ok(true) => summary.triggered += 1,
                Ok(false) => summary.skipped += 1,
                Err(e) => {
                    warn!(
                        "Recovery processing failed for session {}: {:#}",
                        session.session_key, e
                    );
                    summary.skipped += 1;
                }
            }
        }

        info!(
            "Abandoned checkout scan: {} scanned, {} triggered, {} skipped",
            summary.scanned, summary.triggered, summary.skipped
        );
        Ok(summary)
    }

    /// Returns true when a recovery message went out for this session.
    async fn process_session(&self, session: &CheckoutSession, now: DateTime<Utc>) -> Result<bool> {
        if self
            .store
            .recovery_trigger(&session.session_key)
            .await?
            .is_some()
        {
            debug!(
                "Session {} already has a recovery trigger",
                session.session_key
            );
            return Ok(false);
        }

        // Dispatch before recording, so a session is never messaged
        // twice even if the write below fails.
        self.messenger.send_recovery_message(session).await?;

        let trigger = RecoveryTrigger {
            session_key: session.session_key.clone(),
            triggered_at: now,
        };
        if let Err(e) = self.store.record_recovery_trigger(trigger).await {
            error!(
                "Recovery message sent for session {} but the trigger record failed, \
                 the session may be messaged again: {:#}",
                session.session_key, e
            );
        }
        Ok(true)
    }
}
