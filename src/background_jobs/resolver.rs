use crate::audit::AuditLog;
use crate::checkout::{AbandonedCheckoutService, CheckoutStore};
use crate::messaging::RecoveryMessenger;
use crate::tickets::{TicketAutoCloseService, TicketStore};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Lazy, memoized construction of the services the jobs execute.
///
/// Each service is built on first use and cached for the process
/// lifetime. Concurrent first calls share the in-flight construction
/// instead of constructing twice: the cells are single-assignment.
pub struct ServiceResolver {
    checkout_store: Arc<dyn CheckoutStore>,
    ticket_store: Arc<dyn TicketStore>,
    messenger: Arc<dyn RecoveryMessenger>,
    audit_log: Arc<dyn AuditLog>,
    checkout_recovery: OnceCell<Arc<AbandonedCheckoutService>>,
    ticket_autoclose: OnceCell<Arc<TicketAutoCloseService>>,
}

impl ServiceResolver {
    pub fn new(
        checkout_store: Arc<dyn CheckoutStore>,
        ticket_store: Arc<dyn TicketStore>,
        messenger: Arc<dyn RecoveryMessenger>,
        audit_log: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            checkout_store,
            ticket_store,
            messenger,
            audit_log,
            checkout_recovery: OnceCell::new(),
            ticket_autoclose: OnceCell::new(),
        }
    }

    /// The abandoned-checkout recovery service, constructed on first use.
    pub async fn checkout_recovery(&self) -> Arc<AbandonedCheckoutService> {
        self.checkout_recovery
            .get_or_init(|| async {
                debug!("Constructing abandoned checkout recovery service");
                Arc::new(AbandonedCheckoutService::new(
                    Arc::clone(&self.checkout_store),
                    Arc::clone(&self.messenger),
                ))
            })
            .await
            .clone()
    }

    /// The ticket auto-close service, constructed on first use.
    pub async fn ticket_autoclose(&self) -> Arc<TicketAutoCloseService> {
        self.ticket_autoclose
            .get_or_init(|| async {
                debug!("Constructing ticket auto-close service");
                Arc::new(TicketAutoCloseService::new(
                    Arc::clone(&self.ticket_store),
                    Arc::clone(&self.audit_log),
                ))
            })
            .await
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditLog;
    use crate::checkout::MemoryCheckoutStore;
    use crate::messaging::LoggingRecoveryMessenger;
    use crate::tickets::MemoryTicketStore;

    fn test_resolver() -> ServiceResolver {
        ServiceResolver::new(
            Arc::new(MemoryCheckoutStore::new()),
            Arc::new(MemoryTicketStore::new()),
            Arc::new(LoggingRecoveryMessenger),
            Arc::new(MemoryAuditLog::new()),
        )
    }

    #[tokio::test]
    async fn test_services_are_memoized() {
        let resolver = test_resolver();

        let first = resolver.checkout_recovery().await;
        let second = resolver.checkout_recovery().await;
        assert!(Arc::ptr_eq(&first, &second));

        let first = resolver.ticket_autoclose().await;
        let second = resolver.ticket_autoclose().await;
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_concurrent_first_access_constructs_once() {
        let resolver = Arc::new(test_resolver());

        let a = Arc::clone(&resolver);
        let b = Arc::clone(&resolver);
        let (first, second) = tokio::join!(
            tokio::spawn(async move { a.checkout_recovery().await }),
            tokio::spawn(async move { b.checkout_recovery().await }),
        );
        assert!(Arc::ptr_eq(&first.unwrap(), &second.unwrap()));
    }
}
