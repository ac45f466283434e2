use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// Shared handle to the run queue.
pub(crate) type RunQueueHandle = Arc<RunQueue>;

/// FIFO queue of runnable task identifiers.
///
/// Wakers push identifiers at the back and the executor pops them from the
/// front, so tasks run in the order they were woken. The queue lives behind
/// a `std::sync::Mutex` only because a [`Waker`](std::task::Waker) must be
/// `Send + Sync`; the executor itself never leaves its thread.
pub(crate) struct RunQueue {
    ready: Mutex<VecDeque<usize>>,
}

impl RunQueue {
    /// Creates an empty run queue able to hold `capacity` identifiers
    /// before reallocating.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            ready: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Schedules the task `id` after every task already queued.
    pub(crate) fn push(&self, id: usize) {
        self.ready
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(id);
    }

    /// Takes the next task to run, if any.
    pub(crate) fn pop(&self) -> Option<usize> {
        self.ready
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}
