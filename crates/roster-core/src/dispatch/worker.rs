//! Worker execution loops.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use super::manager::Task;

/// Runs tasks pulled from the dispatch queue until the queue is closed and
/// drained.
///
/// Each worker drives one task to completion before taking the next; a
/// single worker never runs two tasks concurrently. A panicking task is
/// caught and logged (its reply slot dies with it, which the submitter
/// observes as a closed channel) and the loop keeps serving.
///
/// Spawned once per worker at pool construction.
pub(crate) async fn worker_loop(worker_id: usize, queue: flume::Receiver<Task>) {
    tracing::trace!("Worker {worker_id} started");

    while let Ok(task) = queue.recv_async().await {
        if AssertUnwindSafe(task).catch_unwind().await.is_err() {
            tracing::error!("Worker {worker_id}: task panicked");
        }
    }

    tracing::trace!("Worker {worker_id} stopped");
}
