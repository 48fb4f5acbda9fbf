//! Checkout domain: session models, data access and the
//! abandoned-checkout recovery engine.

mod models;
mod recovery;
mod store;

pub use models::{CheckoutSession, ContactInfo, RecoveryTrigger};
pub use recovery::{AbandonedCheckoutService, RecoveryRunSummary};
pub use store::{CheckoutStore, MemoryCheckoutStore};
