use core::time::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::oneshot;
use tokio::time::{Instant, sleep};

use super::{Outcome, ReplySlot, WorkerPool};
use crate::Error;

/// Generous deadline for tests that only care about the result, not timing.
const LONG: Duration = Duration::from_secs(60);

async fn settle<T>(slot: ReplySlot<T>) -> Result<T, Error> {
    match slot.await_within(LONG).await {
        Outcome::Completed(result) => result,
        Outcome::TimedOut => panic!("unexpected deadline expiry"),
    }
}

#[tokio::test]
async fn every_task_runs_exactly_once() {
    let pool = WorkerPool::new(4, 64);
    let hits = Arc::new(AtomicUsize::new(0));

    let mut slots = Vec::new();
    for i in 0..64 {
        let hits = Arc::clone(&hits);
        let slot = pool
            .dispatch(async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok::<usize, Error>(i)
            })
            .await
            .expect("dispatch");
        slots.push((i, slot));
    }

    for (i, slot) in slots {
        assert_eq!(settle(slot).await.expect("task result"), i);
    }
    assert_eq!(hits.load(Ordering::SeqCst), 64);

    pool.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn a_full_queue_blocks_the_producer_without_loss() {
    let pool = Arc::new(WorkerPool::new(1, 2));
    let hits = Arc::new(AtomicUsize::new(0));

    // Occupies the only worker until the gate opens.
    let (gate_tx, gate_rx) = oneshot::channel::<()>();
    let blocker = {
        let hits = Arc::clone(&hits);
        pool.dispatch(async move {
            let _ = gate_rx.await;
            hits.fetch_add(1, Ordering::SeqCst);
            Ok::<(), Error>(())
        })
        .await
        .expect("dispatch blocker")
    };
    // Let the worker pick the blocker up so the queue is truly empty.
    sleep(Duration::from_millis(1)).await;

    let mut queued = Vec::new();
    for _ in 0..2 {
        let hits = Arc::clone(&hits);
        let slot = pool
            .dispatch(async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok::<(), Error>(())
            })
            .await
            .expect("queue has room");
        queued.push(slot);
    }

    // The queue is now at capacity: one more submission must suspend, not
    // drop, until the worker frees a slot.
    let admitted = Arc::new(AtomicUsize::new(0));
    let late = {
        let pool = Arc::clone(&pool);
        let hits = Arc::clone(&hits);
        let admitted = Arc::clone(&admitted);
        tokio::spawn(async move {
            let slot = pool
                .dispatch(async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), Error>(())
                })
                .await
                .expect("admitted once space frees");
            admitted.store(1, Ordering::SeqCst);
            slot
        })
    };

    sleep(Duration::from_secs(5)).await;
    assert_eq!(
        admitted.load(Ordering::SeqCst),
        0,
        "producer should still be suspended at capacity"
    );

    gate_tx.send(()).expect("worker is waiting on the gate");

    settle(blocker).await.expect("blocker result");
    for slot in queued {
        settle(slot).await.expect("queued result");
    }
    let slot = late.await.expect("join");
    settle(slot).await.expect("late result");
    assert_eq!(hits.load(Ordering::SeqCst), 4, "no task lost or duplicated");

    pool.shutdown().await;
}

#[tokio::test]
async fn a_failing_task_reports_through_its_slot() {
    let pool = WorkerPool::new(1, 4);

    let slot = pool
        .dispatch(async {
            Err::<(), Error>(Error::StoreFailure {
                context: "boom".into(),
            })
        })
        .await
        .expect("dispatch");
    match settle(slot).await {
        Err(Error::StoreFailure { .. }) => {}
        other => panic!("expected StoreFailure, got {other:?}"),
    }

    // The failure stayed inside the task; the worker keeps serving.
    let slot = pool
        .dispatch(async { Ok::<u8, Error>(7) })
        .await
        .expect("dispatch after failure");
    assert_eq!(settle(slot).await.expect("task result"), 7);

    pool.shutdown().await;
}

async fn exploding_task() -> Result<(), Error> {
    panic!("task exploded")
}

#[tokio::test]
async fn a_panicking_task_does_not_kill_its_worker() {
    let pool = WorkerPool::new(1, 4);

    let slot = pool.dispatch(exploding_task()).await.expect("dispatch");
    match slot.await_within(LONG).await {
        Outcome::Completed(Err(Error::ReplyDropped)) => {}
        other => panic!("expected ReplyDropped, got {other:?}"),
    }

    let slot = pool
        .dispatch(async { Ok::<u8, Error>(1) })
        .await
        .expect("dispatch after panic");
    assert_eq!(settle(slot).await.expect("task result"), 1);

    pool.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn the_guard_times_out_independently_of_the_task() {
    let pool = WorkerPool::new(1, 4);
    let finished = Arc::new(AtomicUsize::new(0));

    let started = Instant::now();
    let slot = {
        let finished = Arc::clone(&finished);
        pool.dispatch(async move {
            sleep(Duration::from_secs(20)).await;
            finished.store(1, Ordering::SeqCst);
            Ok::<(), Error>(())
        })
        .await
        .expect("dispatch")
    };

    match slot.await_within(Duration::from_secs(15)).await {
        Outcome::TimedOut => {}
        other => panic!("expected TimedOut, got {other:?}"),
    }
    let waited = started.elapsed();
    assert!(
        waited >= Duration::from_secs(15) && waited < Duration::from_secs(16),
        "guard fired at {waited:?}"
    );
    assert_eq!(finished.load(Ordering::SeqCst), 0, "task must still be running");

    // The abandoned task runs to completion, and its late write into the
    // buffered slot stalls nothing: the same worker takes fresh work after.
    sleep(Duration::from_secs(6)).await;
    assert_eq!(finished.load(Ordering::SeqCst), 1, "task finishes on its own schedule");

    let slot = pool
        .dispatch(async { Ok::<u8, Error>(1) })
        .await
        .expect("dispatch after timeout");
    assert_eq!(settle(slot).await.expect("task result"), 1);

    pool.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn fifty_workers_drain_two_hundred_tasks_in_parallel() {
    let pool = WorkerPool::new(50, 100);
    let started = Instant::now();

    let mut slots = Vec::with_capacity(200);
    for _ in 0..200 {
        let slot = pool
            .dispatch(async {
                sleep(Duration::from_millis(50)).await;
                Ok::<(), Error>(())
            })
            .await
            .expect("dispatch");
        slots.push(slot);
    }
    for slot in slots {
        settle(slot).await.expect("task result");
    }

    // 200 tasks across 50 workers is 4 waves of 50ms, nowhere near the
    // 10s a serial pool would take.
    let elapsed = started.elapsed();
    assert!(
        elapsed >= Duration::from_millis(150) && elapsed < Duration::from_millis(500),
        "took {elapsed:?}"
    );

    pool.shutdown().await;
}

#[tokio::test]
async fn shutdown_refuses_new_work() {
    let pool = WorkerPool::new(2, 4);
    pool.shutdown().await;

    match pool.dispatch(async { Ok::<(), Error>(()) }).await {
        Err(Error::PoolUnavailable) => {}
        Ok(_) => panic!("dispatch succeeded after shutdown"),
        Err(other) => panic!("expected PoolUnavailable, got {other:?}"),
    }

    // Idempotent.
    pool.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_waits_for_queued_and_in_flight_tasks() {
    let pool = WorkerPool::new(1, 4);
    let hits = Arc::new(AtomicUsize::new(0));

    // One task in flight and one queued behind it. Slots are intentionally
    // dropped: shutdown alone must guarantee both runs complete.
    for _ in 0..2 {
        let hits = Arc::clone(&hits);
        let _ = pool
            .dispatch(async move {
                sleep(Duration::from_millis(100)).await;
                hits.fetch_add(1, Ordering::SeqCst);
                Ok::<(), Error>(())
            })
            .await
            .expect("dispatch");
    }
    sleep(Duration::from_millis(1)).await;

    pool.shutdown().await;
    assert_eq!(
        hits.load(Ordering::SeqCst),
        2,
        "shutdown returned before admitted tasks finished"
    );
}
