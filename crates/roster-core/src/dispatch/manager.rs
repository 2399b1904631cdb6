//! The worker pool and its bounded dispatch queue.

use core::future::Future;

use futures::future::{BoxFuture, join_all};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::reply::ReplySlot;
use super::worker::worker_loop;
use crate::Error;

/// A queued unit of deferred work.
///
/// Tasks carry no identity and no return value at the type level; they
/// communicate exclusively through the reply slot they close over, and are
/// discarded after execution.
pub(crate) type Task = BoxFuture<'static, ()>;

/// A fixed-cardinality pool of workers pulling tasks from one shared,
/// bounded queue.
///
/// The queue capacity is the service's sole admission-control knob: once the
/// queue is full, submitters wait for a slot instead of growing memory.
/// Workers are started once at construction and live until [`shutdown`];
/// membership never changes in between.
///
/// [`shutdown`]: WorkerPool::shutdown
pub struct WorkerPool {
    /// `None` once the pool has shut down. Dropping the sender closes the
    /// queue, which is what tells workers to drain and exit.
    queue_tx: Mutex<Option<flume::Sender<Task>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    num_workers: usize,
    queue_capacity: usize,
}

impl WorkerPool {
    /// Starts `num_workers` worker loops over a queue of `queue_capacity`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(num_workers: usize, queue_capacity: usize) -> Self {
        let (tx, rx) = flume::bounded(queue_capacity);

        let workers = (0..num_workers)
            .map(|worker_id| tokio::spawn(worker_loop(worker_id, rx.clone())))
            .collect();

        tracing::debug!(num_workers, queue_capacity, "Worker pool started");
        Self {
            queue_tx: Mutex::new(Some(tx)),
            workers: Mutex::new(workers),
            num_workers,
            queue_capacity,
        }
    }

    /// Number of workers, fixed at construction.
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Dispatch queue capacity, fixed at construction.
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Submits `work` to the pool and returns the slot its result will be
    /// written into.
    ///
    /// Suspends while the queue is at capacity; resolves as soon as the task
    /// is admitted. Pair the returned slot with
    /// [`ReplySlot::await_within`] to bound the wait for the result. The
    /// two deadlines are independent, and a submitter that stops waiting
    /// does not cancel the task.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolUnavailable`] if the pool has shut down; the
    /// task is never run.
    pub async fn dispatch<T, W>(&self, work: W) -> Result<ReplySlot<T>, Error>
    where
        T: Send + 'static,
        W: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let tx = self
            .queue_tx
            .lock()
            .as_ref()
            .cloned()
            .ok_or(Error::PoolUnavailable)?;

        let (reply_tx, slot) = ReplySlot::new();
        let task: Task = Box::pin(async move {
            let result = work.await;
            // The submitter may have stopped waiting; a dropped receiver is
            // not an error for the worker.
            let _ = reply_tx.send(result);
        });

        tx.send_async(task)
            .await
            .map_err(|_| Error::PoolUnavailable)?;
        Ok(slot)
    }

    /// Closes the queue and waits for every worker to finish.
    ///
    /// Tasks already admitted still run to completion (workers exit only
    /// once the queue is both closed and drained) and new submissions fail
    /// with [`Error::PoolUnavailable`]. A submission racing this call either
    /// fails the availability check or completes its send before its sender
    /// clone drops; the task is drained either way. Returns only after all
    /// workers have exited, so no task execution survives teardown silently.
    /// Calling `shutdown` again is a no-op.
    pub async fn shutdown(&self) {
        let tx = self.queue_tx.lock().take();
        let workers = core::mem::take(&mut *self.workers.lock());
        if tx.is_none() && workers.is_empty() {
            return;
        }
        drop(tx);

        tracing::info!(workers = workers.len(), "Dispatch queue closed; draining workers");
        for join in join_all(workers).await {
            if let Err(e) = join {
                tracing::error!("Worker terminated abnormally: {e}");
            }
        }
        tracing::info!("Worker pool shutdown complete");
    }
}
