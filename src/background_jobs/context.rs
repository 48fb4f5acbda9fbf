use super::resolver::ServiceResolver;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Context provided to jobs during execution.
///
/// Carries the lazily-constructed business services and a cancellation
/// token for graceful shutdown handling.
#[derive(Clone)]
pub struct JobContext {
    /// Token to check for cancellation/shutdown requests.
    pub cancellation_token: CancellationToken,

    /// Resolver for the services backing the jobs.
    pub services: Arc<ServiceResolver>,
}

impl JobContext {
    pub fn new(cancellation_token: CancellationToken, services: Arc<ServiceResolver>) -> Self {
        Self {
            cancellation_token,
            services,
        }
    }

    /// Check if cancellation has been requested.
    ///
    /// Jobs should periodically check this during long-running operations
    /// and return early with `JobError::Cancelled` if true.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    /// Derive a context with a child token scoped to a single run.
    pub(crate) fn for_run(&self) -> Self {
        Self {
            cancellation_token: self.cancellation_token.child_token(),
            services: Arc::clone(&self.services),
        }
    }
}
