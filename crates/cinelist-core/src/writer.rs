//! `FavoriteWriter` - off-thread, fire-and-forget favorite mutations.

use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use cinelist_db::{FavoriteRecord, FavoriteStore};
use tokio::sync::{mpsc, oneshot};

/// A queued store mutation.
#[derive(Debug)]
enum WriteOp {
    Upsert(FavoriteRecord),
    Delete(String),
    Flush(oneshot::Sender<()>),
}

/// Single background worker that applies favorite writes in submission order.
///
/// Submitting never blocks the caller. Write failures are logged and dropped.
/// Dropping the writer closes the queue and joins the worker once the
/// remaining writes are applied.
#[derive(Debug)]
pub struct FavoriteWriter {
    tx: Option<mpsc::UnboundedSender<WriteOp>>,
    handle: Option<JoinHandle<()>>,
}

impl FavoriteWriter {
    /// Starts the worker thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to spawn the thread.
    pub fn spawn(store: Arc<dyn FavoriteStore>) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = std::thread::Builder::new()
            .name(String::from("favorites-writer"))
            .spawn(move || run(&*store, rx))
            .context("failed to spawn favorites writer thread")?;
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    /// Queues an insert-or-replace.
    pub fn upsert(&self, record: FavoriteRecord) {
        self.submit(WriteOp::Upsert(record));
    }

    /// Queues a delete by ID.
    pub fn delete(&self, imdb_id: String) {
        self.submit(WriteOp::Delete(imdb_id));
    }

    /// Waits until every write queued before this call has been applied.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if !self.submit(WriteOp::Flush(ack)) {
            return;
        }
        if done.await.is_err() {
            tracing::warn!("favorites writer stopped before flush completed");
        }
    }

    fn submit(&self, op: WriteOp) -> bool {
        let Some(tx) = self.tx.as_ref() else {
            return false;
        };
        if tx.send(op).is_err() {
            tracing::warn!("favorites writer is gone, dropping write");
            return false;
        }
        true
    }
}

impl Drop for FavoriteWriter {
    fn drop(&mut self) {
        drop(self.tx.take());
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::error!("favorites writer thread panicked");
        }
    }
}

fn run(store: &dyn FavoriteStore, mut rx: mpsc::UnboundedReceiver<WriteOp>) {
    tracing::debug!("favorites writer started");
    while let Some(op) = rx.blocking_recv() {
        match op {
            WriteOp::Upsert(record) => match store.upsert(&record) {
                Ok(()) => tracing::debug!(imdb_id = %record.imdb_id, "favorite saved"),
                Err(err) => tracing::warn!(
                    imdb_id = %record.imdb_id,
                    error = %format!("{err:#}"),
                    "failed to save favorite"
                ),
            },
            WriteOp::Delete(imdb_id) => match store.delete_by_id(&imdb_id) {
                Ok(()) => tracing::debug!(imdb_id = %imdb_id, "favorite removed"),
                Err(err) => tracing::warn!(
                    imdb_id = %imdb_id,
                    error = %format!("{err:#}"),
                    "failed to remove favorite"
                ),
            },
            WriteOp::Flush(ack) => {
                if ack.send(()).is_err() {
                    tracing::debug!("flush waiter went away");
                }
            }
        }
    }
    tracing::debug!("favorites writer stopped");
}
