//! Bounded task queue feeding the worker pool
//!
//! Producers are workers that discover new links; consumers are the same
//! workers pulling their next page. Every queued task travels with the
//! [`PendingTicket`] that counts it, so a task that never reaches a consumer
//! is released the moment it is abandoned.

use crate::state::PendingTicket;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc::error::SendTimeoutError;
use tokio::sync::{mpsc, watch, Mutex};
use url::Url;

/// A page to analyze at a given distance from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Canonical absolute URL of the page
    pub url: Url,

    /// Number of hops from the seed (the seed is depth 0)
    pub depth: u32,
}

impl Task {
    /// The task for the crawl's entry point
    pub fn seed(url: Url) -> Self {
        Self { url, depth: 0 }
    }

    /// A task for a page linked from this one
    pub fn child(&self, url: Url) -> Self {
        Self {
            url,
            depth: self.depth + 1,
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (depth {})", self.url, self.depth)
    }
}

/// A task together with the ticket that keeps it counted
#[derive(Debug)]
pub struct QueuedTask {
    task: Task,
    ticket: PendingTicket,
}

impl QueuedTask {
    pub fn task(&self) -> &Task {
        &self.task
    }

    /// Splits the task from its ticket; the task stays counted until the ticket is dropped
    pub fn into_parts(self) -> (Task, PendingTicket) {
        (self.task, self.ticket)
    }
}

/// Why an enqueue attempt was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The queue stayed full for the whole bounded wait
    QueueFull { waited: Duration },

    /// The queue had already been closed
    Closed,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull { waited } => write!(f, "task queue full after {:?}", waited),
            Self::Closed => write!(f, "task queue closed"),
        }
    }
}

/// Result of [`TaskQueue::enqueue`]
///
/// On `Dropped` the ticket has already been released, so the pending count is
/// back to its value before the ticket was taken. The task is handed back for
/// diagnostics.
#[derive(Debug)]
#[must_use]
pub enum EnqueueOutcome {
    Enqueued,
    Dropped { task: Task, reason: DropReason },
}

impl EnqueueOutcome {
    pub fn is_enqueued(&self) -> bool {
        matches!(self, Self::Enqueued)
    }
}

/// Bounded multi-producer, multi-consumer FIFO of tasks
pub struct TaskQueue {
    sender: mpsc::Sender<QueuedTask>,
    receiver: Mutex<mpsc::Receiver<QueuedTask>>,
    closed: watch::Sender<bool>,
    enqueue_timeout: Duration,
}

impl TaskQueue {
    /// Creates a queue holding at most `capacity` tasks
    ///
    /// `enqueue_timeout` bounds how long a producer waits for space.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; configuration validation rejects that first.
    pub fn new(capacity: usize, enqueue_timeout: Duration) -> Self {
        let (sender, receiver) = mpsc::channel(capacity);
        let (closed, _) = watch::channel(false);
        Self {
            sender,
            receiver: Mutex::new(receiver),
            closed,
            enqueue_timeout,
        }
    }

    /// Offers a counted task to the queue, waiting at most the enqueue timeout
    pub async fn enqueue(&self, task: Task, ticket: PendingTicket) -> EnqueueOutcome {
        if self.is_closed() {
            drop(ticket);
            return EnqueueOutcome::Dropped {
                task,
                reason: DropReason::Closed,
            };
        }

        let queued = QueuedTask { task, ticket };
        match self.sender.send_timeout(queued, self.enqueue_timeout).await {
            Ok(()) => EnqueueOutcome::Enqueued,
            Err(SendTimeoutError::Timeout(rejected)) => {
                let (task, _released) = rejected.into_parts();
                EnqueueOutcome::Dropped {
                    task,
                    reason: DropReason::QueueFull {
                        waited: self.enqueue_timeout,
                    },
                }
            }
            Err(SendTimeoutError::Closed(rejected)) => {
                let (task, _released) = rejected.into_parts();
                EnqueueOutcome::Dropped {
                    task,
                    reason: DropReason::Closed,
                }
            }
        }
    }

    /// Waits for the next task
    ///
    /// Returns `None` once the queue has been closed. Closing only happens when
    /// nothing is pending, so no counted task is left behind.
    pub async fn recv(&self) -> Option<QueuedTask> {
        let mut closed = self.closed.subscribe();
        tokio::select! {
            biased;
            _ = closed.wait_for(|closed| *closed) => None,
            task = async { self.receiver.lock().await.recv().await } => task,
        }
    }

    /// Closes the queue, waking every blocked consumer
    ///
    /// Returns `true` only for the call that actually closed it.
    pub fn close(&self) -> bool {
        !self.closed.send_replace(true)
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Number of tasks currently waiting in the queue
    pub fn len(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
