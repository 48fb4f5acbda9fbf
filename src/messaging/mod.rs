//! Recovery-messaging collaborator.
//!
//! Delivery mechanics (templates, SMS/email providers) belong to the
//! platform; this subsystem only needs a dispatch seam.

use crate::checkout::CheckoutSession;
use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

/// Dispatches a recovery message for an abandoned checkout session.
#[async_trait]
pub trait RecoveryMessenger: Send + Sync {
    /// Send the recovery message for `session`. Returning `Ok` means the
    /// dispatch was acknowledged; callers record the trigger only after
    /// that.
    async fn send_recovery_message(&self, session: &CheckoutSession) -> Result<()>;
}

/// Messenger that only logs, for standalone runs without a delivery
/// backend.
pub struct LoggingRecoveryMessenger;

#[async_trait]
impl RecoveryMessenger for LoggingRecoveryMessenger {
    async fn send_recovery_message(&self, session: &CheckoutSession) -> Result<()> {
        info!(
            "Recovery message for session {} (email: {}, phone: {})",
            session.session_key,
            session.contact.email.is_some(),
            session.contact.phone.is_some()
        );
        Ok(())
    }
}
