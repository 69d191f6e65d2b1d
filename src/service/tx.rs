//! Transaction coordinator.
//!
//! [`TxManager::read_committed`] is the only place transactions begin,
//! commit, or roll back. The unit of work receives the transaction handle by
//! value and hands it back with its outcome; anything it calls in between
//! takes `&mut S::Tx` and thereby joins the same transaction. There is no
//! ambient or global transaction state.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;

use crate::error::{AppError, Result};
use crate::store::Store;

pub struct TxManager<S: Store> {
    store: Arc<S>,
}

impl<S: Store> Clone for TxManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> TxManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Run `work` inside a read-committed transaction.
    ///
    /// Commits when `work` returns `Ok`, rolls back when it returns `Err`
    /// (surfacing the original error), and treats a panic inside `work` as a
    /// failure: the panic is caught at this boundary, the transaction is
    /// released, and a structured error is returned instead of unwinding
    /// further. Commit and rollback failures surface as
    /// [`AppError::Transaction`].
    pub async fn read_committed<T, F, Fut>(&self, work: F) -> Result<T>
    where
        F: FnOnce(S::Tx) -> Fut,
        Fut: Future<Output = (S::Tx, Result<T>)>,
    {
        let tx = self.store.begin().await?;

        match AssertUnwindSafe(work(tx)).catch_unwind().await {
            Ok((tx, Ok(value))) => {
                self.store
                    .commit(tx)
                    .await
                    .map_err(|e| AppError::Transaction(format!("commit failed: {e}")))?;
                Ok(value)
            }
            Ok((tx, Err(err))) => {
                if let Err(rb) = self.store.rollback(tx).await {
                    return Err(AppError::Transaction(format!(
                        "rollback failed: {rb} (while handling: {err})"
                    )));
                }
                Err(err)
            }
            Err(panic) => {
                // The handle was consumed by the unwinding future and
                // dropped, which releases the transaction without
                // committing.
                let msg = panic_message(panic.as_ref());
                tracing::error!("Recovered from panic inside transaction: {}", msg);
                Err(AppError::Transaction(format!(
                    "recovered from panic: {msg}"
                )))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
