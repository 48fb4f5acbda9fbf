use chrono::{DateTime, Utc};

/// Contact details captured during checkout.
///
/// A session must carry at least one channel to be eligible for recovery
/// messaging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ContactInfo {
    pub fn email(address: impl Into<String>) -> Self {
        Self {
            email: Some(address.into()),
            phone: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none()
    }
}

/// A checkout session as seen by the detection engine.
///
/// Owned by the commerce platform; this subsystem only reads it.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// Opaque key identifying the session in the commerce platform.
    pub session_key: String,
    pub contact: ContactInfo,
    /// When the checkout-started event was recorded.
    pub started_at: DateTime<Utc>,
    /// Set when a completed-purchase event exists for the session.
    pub completed_at: Option<DateTime<Utc>>,
    /// Timestamp of the most recent checkout-related event.
    pub last_event_at: DateTime<Utc>,
}

/// Durable marker that a recovery message was dispatched for a session.
///
/// Its existence is the sole authority suppressing re-triggering: a
/// session is recovered at most once, ever.
#[derive(Debug, Clone)]
pub struct RecoveryTrigger {
    pub session_key: String,
    pub triggered_at: DateTime<Utc>,
}
