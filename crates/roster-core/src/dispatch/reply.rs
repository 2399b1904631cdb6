//! One-shot reply slots and the deadline race.

use core::time::Duration;

use tokio::sync::oneshot;
use tokio::time::timeout;

use crate::Error;

/// Outcome of racing a [`ReplySlot`] against a wall-clock deadline.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The paired task wrote a result before the deadline.
    Completed(Result<T, Error>),
    /// The deadline elapsed first. The task is not cancelled; its eventual
    /// result lands in the abandoned slot and is never read.
    TimedOut,
}

/// Single-use, single-consumer channel correlating one task's result back
/// to its submitter.
///
/// Created fresh per submission by [`WorkerPool::dispatch`] and owned
/// exclusively by the submitter. The underlying channel buffers one value,
/// so the worker's write completes immediately even after the submitter has
/// given up waiting.
///
/// [`WorkerPool::dispatch`]: super::WorkerPool::dispatch
#[derive(Debug)]
pub struct ReplySlot<T> {
    rx: oneshot::Receiver<Result<T, Error>>,
}

impl<T> ReplySlot<T> {
    /// Creates a slot together with the sender half handed to the task.
    pub(crate) fn new() -> (oneshot::Sender<Result<T, Error>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// Races the slot against `deadline` and returns whichever fires first.
    ///
    /// Suspends the caller until one of the two events occurs; never
    /// busy-waits. A slot whose task died without replying (worker panic,
    /// teardown mid-task) resolves to `Completed(Err(Error::ReplyDropped))`.
    pub async fn await_within(self, deadline: Duration) -> Outcome<T> {
        match timeout(deadline, self.rx).await {
            Ok(Ok(result)) => Outcome::Completed(result),
            Ok(Err(_)) => Outcome::Completed(Err(Error::ReplyDropped)),
            Err(_) => Outcome::TimedOut,
        }
    }
}
