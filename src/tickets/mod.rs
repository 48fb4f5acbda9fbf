//! Support-ticket domain: ticket models, data access and the auto-close
//! engine.

mod autoclose;
mod models;
mod store;

pub use autoclose::{AutoCloseSummary, TicketAutoCloseService};
pub use models::{SupportTicket, TicketStatus};
pub use store::{MemoryTicketStore, TicketStore};
