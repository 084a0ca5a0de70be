use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Counts tasks that have been started but not yet fully processed
///
/// The counter is driven by [`PendingTicket`]s: [`PendingCounter::ticket`]
/// increments it, and dropping the ticket decrements it exactly once. A task
/// carries its ticket from before it becomes visible in the queue until its
/// pipeline, including every child enqueue, has returned. A ticket for a task
/// that never made it into the queue is dropped on the spot.
///
/// Because a parent holds its own ticket while it takes tickets for its
/// children, the count cannot touch zero while discovered work is still being
/// handed over.
#[derive(Debug, Default)]
pub struct PendingCounter {
    outstanding: AtomicUsize,
    drained: AtomicUsize,
    zero: Notify,
}

impl PendingCounter {
    /// Creates a counter with no outstanding work
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Counts one more task and returns the ticket that releases it
    pub fn ticket(self: &Arc<Self>) -> PendingTicket {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        PendingTicket {
            counter: Arc::clone(self),
        }
    }

    /// Number of tasks currently counted
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Number of times the count has dropped to zero
    pub fn drained_count(&self) -> usize {
        self.drained.load(Ordering::SeqCst)
    }

    /// Waits until no task is outstanding
    ///
    /// Returns immediately when the count is already zero, so callers must
    /// take the first ticket before waiting.
    pub async fn wait_for_zero(&self) {
        loop {
            let notified = self.zero.notified();
            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn release(&self) {
        let previous = self.outstanding.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "pending counter released below zero");
        if previous == 1 {
            self.drained.fetch_add(1, Ordering::SeqCst);
            self.zero.notify_one();
        }
    }
}

/// Proof that one task is counted by a [`PendingCounter`]
///
/// Not `Clone`: each ticket releases the count exactly once, when dropped.
#[derive(Debug)]
#[must_use = "dropping a ticket immediately releases the task it counts"]
pub struct PendingTicket {
    counter: Arc<PendingCounter>,
}

impl Drop for PendingTicket {
    fn drop(&mut self) {
        self.counter.release();
    }
}
