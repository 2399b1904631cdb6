//! Request-decoupling core: a fixed-size worker pool fed by a bounded queue.
//!
//! This module sits between an inbound request and a potentially slow
//! backing-store operation. A handler packages the operation as an opaque
//! task, submits it through the bounded dispatch queue (waiting when the
//! queue is at capacity), and receives a private, single-use [`ReplySlot`]
//! that some idle worker will eventually write the result into. The handler
//! then races the slot against a wall-clock deadline via
//! [`ReplySlot::await_within`], getting back an [`Outcome`] either way.
//!
//! ## Guarantees
//!
//! - Every admitted task executes on exactly one worker, exactly once,
//!   unless the pool shuts down first, in which case admission fails and
//!   the task never runs.
//! - A full queue suspends the submitter; nothing is dropped or reordered
//!   behind its back (FIFO order itself is not contractual).
//! - A reply slot receives at most one write, and that write never blocks
//!   the worker, even when the submitter stopped waiting long ago.
//! - A task that fails, or even panics, never takes its worker down with it.
//!
//! The pool is a process-wide resource: construct one [`WorkerPool`] at
//! startup, share it behind an `Arc`, and call [`WorkerPool::shutdown`]
//! once at teardown.

pub mod manager;
pub mod reply;
pub mod worker;

#[cfg(test)]
mod tests;

pub use manager::WorkerPool;
pub use reply::{Outcome, ReplySlot};
