use crate::runtime::queue::{RunQueue, RunQueueHandle};
use crate::runtime::task::waker::TaskWaker;
use crate::runtime::task::{JoinHandle, Runnable, Task};
use crate::utils::Slab;

use log::trace;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// Single-threaded task executor.
///
/// The `Executor` owns every spawned task, keyed by a small identifier, and
/// the run queue wakers push those identifiers to. Tasks are polled one at a
/// time on the thread that drives [`Runtime::block_on`](super::Runtime::block_on);
/// a task only gives up control by returning `Poll::Pending`.
pub(crate) struct Executor {
    /// Identifiers of tasks ready to be polled, in wake-up order.
    queue: RunQueueHandle,

    /// Live tasks, removed once they complete.
    tasks: RefCell<Slab<Rc<dyn Runnable>>>,
}

impl Executor {
    /// Creates an executor whose run queue and task table start with room
    /// for `capacity` entries.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            queue: Arc::new(RunQueue::with_capacity(capacity)),
            tasks: RefCell::new(Slab::with_capacity(capacity)),
        }
    }

    pub(crate) fn queue(&self) -> &RunQueueHandle {
        &self.queue
    }

    /// Number of spawned tasks that have not completed yet.
    pub(crate) fn live_tasks(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Registers `future` as a new task and queues it behind every task that
    /// is already runnable.
    pub(crate) fn spawn<F, T>(&self, future: F) -> JoinHandle<T>
    where
        F: Future<Output = T> + 'static,
        T: 'static,
    {
        let task = {
            let mut tasks = self.tasks.borrow_mut();
            let id = tasks.vacant_key();

            let header = Arc::new(TaskWaker::queued(id, self.queue.clone()));
            let task = Rc::new(Task::new(future, header));
            tasks.insert(task.clone());

            task
        };

        let id = task.header.id();
        self.queue.push(id);
        trace!("spawned task {id}");

        JoinHandle { task }
    }

    /// Polls task `id` once and drops it if it completed.
    ///
    /// Unknown identifiers are ignored.
    pub(crate) fn run_task(&self, id: usize) {
        let task = self.tasks.borrow().get(id).cloned();
        let Some(task) = task else {
            return;
        };

        if task.run() {
            let finished = self.tasks.borrow_mut().remove(id);
            drop(finished);
            trace!("task {id} completed");
        }
    }
}
