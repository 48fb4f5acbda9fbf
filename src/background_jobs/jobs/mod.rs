//! Specific background job implementations.
//!
//! Thin wrappers binding the trigger engines to the scheduler: each job
//! resolves its backing service through the [`JobContext`] and reports a
//! JSON run summary.
//!
//! [`JobContext`]: super::JobContext

pub mod checkout_recovery;
pub mod ticket_autoclose;

pub use checkout_recovery::CheckoutRecoveryJob;
pub use ticket_autoclose::TicketAutoCloseJob;
