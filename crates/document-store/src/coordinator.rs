use std::fmt::Display;
use std::time::Instant;

use futures_util::future::BoxFuture;
use tracing::{debug, warn};

use crate::StoreError;
use crate::store::{DocumentStore, StoreTransaction};

/// Runs units of work inside a single store transaction.
///
/// The body receives the transaction handle. If it returns `Ok`, the
/// transaction is committed and the value is handed back; a commit failure
/// surfaces as the error instead. If it returns `Err`, the transaction is
/// rolled back and the original error is returned unchanged, even when the
/// rollback itself fails.
#[derive(Debug, Clone)]
pub struct TransactionCoordinator<S> {
    store: S,
}

impl<S: DocumentStore> TransactionCoordinator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Gets a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Executes `body` atomically.
    ///
    /// The body must own everything it captures, so callers move their
    /// inputs into a `move |tx| Box::pin(async move { .. })` closure.
    #[tracing::instrument(skip(self, body))]
    pub async fn run<T, E, F>(&self, name: &'static str, body: F) -> Result<T, E>
    where
        F: for<'t> FnOnce(&'t mut S::Transaction) -> BoxFuture<'t, Result<T, E>> + Send,
        T: Send,
        E: From<StoreError> + Display + Send,
    {
        let started = Instant::now();
        let mut tx = self.store.begin().await?;

        let outcome = body(&mut tx).await;

        let result = match outcome {
            Ok(value) => match tx.commit().await {
                Ok(()) => {
                    debug!(transaction = name, "Transaction committed");
                    metrics::counter!("transactions_committed_total", "transaction" => name)
                        .increment(1);
                    Ok(value)
                }
                Err(err) => {
                    warn!(transaction = name, error = %err, "Transaction commit failed");
                    metrics::counter!("transactions_aborted_total", "transaction" => name)
                        .increment(1);
                    Err(E::from(err))
                }
            },
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(
                        transaction = name,
                        error = %rollback_err,
                        "Rollback failed, original error is preserved"
                    );
                }
                debug!(transaction = name, error = %err, "Transaction rolled back");
                metrics::counter!("transactions_aborted_total", "transaction" => name)
                    .increment(1);
                Err(err)
            }
        };

        metrics::histogram!("transaction_duration_seconds", "transaction" => name)
            .record(started.elapsed().as_secs_f64());

        result
    }
}
