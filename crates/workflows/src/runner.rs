//! The workflow runner shared by every multi-entity operation.

use document_store::{DocumentStore, TransactionCoordinator};
use futures_util::future::BoxFuture;
use tracing::{info, warn};

use crate::error::Result;
use crate::services::PaymentGateway;

/// Runs the marketplace's multi-entity workflows.
///
/// Each workflow performs its reads and writes inside one store transaction
/// obtained from the [`TransactionCoordinator`], so either every write of a
/// workflow becomes visible or none does.
pub struct Workflows<S, G> {
    coordinator: TransactionCoordinator<S>,
    gateway: G,
}

impl<S, G> Workflows<S, G>
where
    S: DocumentStore,
    G: PaymentGateway,
{
    pub fn new(store: S, gateway: G) -> Self {
        Self {
            coordinator: TransactionCoordinator::new(store),
            gateway,
        }
    }

    /// Gets a reference to the underlying store.
    pub fn store(&self) -> &S {
        self.coordinator.store()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Runs `body` in a transaction and records the outcome.
    pub(crate) async fn execute<T, F>(&self, workflow: &'static str, body: F) -> Result<T>
    where
        F: for<'t> FnOnce(&'t mut S::Transaction) -> BoxFuture<'t, Result<T>> + Send,
        T: Send,
    {
        metrics::counter!("workflow_executions_total", "workflow" => workflow).increment(1);

        let result = self.coordinator.run(workflow, body).await;

        match &result {
            Ok(_) => info!(workflow, "Workflow committed"),
            Err(err) => {
                metrics::counter!("workflow_failures_total", "workflow" => workflow).increment(1);
                warn!(
                    workflow,
                    error = %err,
                    retryable = err.is_retryable(),
                    "Workflow aborted"
                );
            }
        }

        result
    }
}
