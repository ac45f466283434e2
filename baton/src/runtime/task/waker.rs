use super::state::{COMPLETED, IDLE, NOTIFIED, QUEUED, RUNNING};
use crate::runtime::queue::RunQueueHandle;

use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{RawWaker, RawWakerVTable, Waker};

/// Scheduling header of a task.
///
/// The header is the part of a task that wakers point at. It only knows the
/// task's identifier, its scheduling state and where to push the identifier
/// when the task becomes runnable, which keeps it `Send + Sync` even though
/// the task's future is not.
pub(crate) struct TaskWaker {
    /// Identifier of the task inside the executor.
    id: usize,

    /// Current scheduling state (see [`state`](super::state)).
    state: AtomicUsize,

    /// Queue the identifier is pushed to on wake-up.
    queue: RunQueueHandle,
}

impl TaskWaker {
    /// Creates the header of a task that is already queued.
    ///
    /// The caller is responsible for pushing `id` to `queue` exactly once.
    pub(crate) fn queued(id: usize, queue: RunQueueHandle) -> Self {
        Self {
            id,
            state: AtomicUsize::new(QUEUED),
            queue,
        }
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    /// Moves the task from `QUEUED` to `RUNNING`.
    ///
    /// Returns `false` if the task was not queued, in which case it must not
    /// be polled.
    pub(crate) fn begin_poll(&self) -> bool {
        self.state
            .compare_exchange(QUEUED, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Ends a poll that returned `Poll::Pending`.
    ///
    /// The task goes back to `IDLE`, unless it was woken during the poll, in
    /// which case it is queued again behind every task already waiting.
    pub(crate) fn end_pending(&self) {
        if self
            .state
            .compare_exchange(RUNNING, IDLE, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.state.store(QUEUED, Ordering::Release);
            self.queue.push(self.id);
        }
    }

    /// Marks the task as finished. Later wake-ups are ignored.
    pub(crate) fn complete(&self) {
        self.state.store(COMPLETED, Ordering::Release);
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.state.load(Ordering::Acquire) == COMPLETED
    }

    /// Signals the task to be rescheduled.
    ///
    /// If the task is `IDLE`, it moves to `QUEUED` and its identifier is
    /// pushed to the run queue. If the task is `RUNNING`, it moves to
    /// `NOTIFIED` so it is re-queued right after the current poll.
    pub(crate) fn wake(&self) {
        loop {
            match self.state.load(Ordering::Acquire) {
                IDLE => {
                    if self
                        .state
                        .compare_exchange(IDLE, QUEUED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        self.queue.push(self.id);
                        return;
                    }
                }
                RUNNING => {
                    if self
                        .state
                        .compare_exchange(RUNNING, NOTIFIED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        return;
                    }
                }
                _ => return,
            }
        }
    }
}

static VTABLE: RawWakerVTable = RawWakerVTable::new(clone_raw, wake_raw, wake_by_ref_raw, drop_raw);

/// Creates a [`Waker`] that reschedules the task owning `header`.
///
/// The pointer stored inside the `RawWaker` comes from `Arc::into_raw`, and
/// every vtable function below keeps the strong count balanced.
pub(crate) fn make_waker(header: Arc<TaskWaker>) -> Waker {
    unsafe { Waker::from_raw(RawWaker::new(Arc::into_raw(header) as *const (), &VTABLE)) }
}

fn clone_raw(ptr: *const ()) -> RawWaker {
    let arc = unsafe { Arc::from_raw(ptr as *const TaskWaker) };
    let cloned = arc.clone();
    mem::forget(arc);

    RawWaker::new(Arc::into_raw(cloned) as *const (), &VTABLE)
}

fn wake_raw(ptr: *const ()) {
    let arc = unsafe { Arc::from_raw(ptr as *const TaskWaker) };
    arc.wake();
}

fn wake_by_ref_raw(ptr: *const ()) {
    let arc = unsafe { Arc::from_raw(ptr as *const TaskWaker) };
    arc.wake();
    mem::forget(arc);
}

fn drop_raw(ptr: *const ()) {
    drop(unsafe { Arc::from_raw(ptr as *const TaskWaker) });
}
