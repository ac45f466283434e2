use super::context::{current_executor, enter_context};
use super::executor::Executor;
use super::task::JoinHandle;
use super::task::waker::{TaskWaker, make_waker};

use log::trace;
use std::pin::pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Run-queue identifier reserved for the future passed to `block_on`.
const ROOT: usize = usize::MAX;

/// The main runtime handle.
///
/// `Runtime` is responsible for:
/// - spawning asynchronous tasks,
/// - driving task execution on the current thread,
/// - providing a synchronous entry point via [`block_on`](Self::block_on).
///
/// Scheduling is cooperative: a task runs until it returns `Poll::Pending`,
/// and runnable tasks are polled in the order they were woken.
pub struct Runtime {
    /// Task executor responsible for scheduling and running futures.
    executor: Rc<Executor>,
}

impl Runtime {
    /// Creates a new runtime whose queues start with room for
    /// `queue_capacity` tasks.
    pub(crate) fn new(queue_capacity: usize) -> Self {
        Self {
            executor: Rc::new(Executor::new(queue_capacity)),
        }
    }

    /// Spawns a future onto the runtime.
    ///
    /// The future does not need to be `Send`; it starts running on the next
    /// call to [`block_on`](Self::block_on).
    ///
    /// # Examples
    ///
    /// ```rust
    /// let runtime = baton::RuntimeBuilder::new().build();
    /// let handle = runtime.spawn(async { "background" });
    /// assert_eq!(runtime.block_on(handle), "background");
    /// ```
    pub fn spawn<F, T>(&self, future: F) -> JoinHandle<T>
    where
        F: Future<Output = T> + 'static,
        T: 'static,
    {
        self.executor.spawn(future)
    }

    /// Runs a future to completion on the current thread.
    ///
    /// While the future is pending, every spawned task that is runnable gets
    /// polled in wake-up order. The future itself may borrow from the
    /// caller's stack.
    ///
    /// # Panics
    ///
    /// - Panics if called from within a runtime context (nested `block_on`).
    /// - Panics if the future and every spawned task are suspended and nothing
    ///   is left to wake them, for example when a lock is never released.
    ///
    /// # Examples
    ///
    /// ```rust
    /// let runtime = baton::RuntimeBuilder::new().build();
    /// let result = runtime.block_on(async { 42 });
    /// assert_eq!(result, 42);
    /// ```
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        assert!(
            current_executor().is_none(),
            "block_on cannot be called from within a runtime"
        );
        let _context = enter_context(self.executor.clone());

        let queue = self.executor.queue();
        let root = Arc::new(TaskWaker::queued(ROOT, queue.clone()));
        queue.push(ROOT);

        let waker = make_waker(root.clone());
        let mut cx = Context::from_waker(&waker);
        let mut future = pin!(future);

        while let Some(id) = queue.pop() {
            if id != ROOT {
                self.executor.run_task(id);
                continue;
            }

            if !root.begin_poll() {
                continue;
            }

            if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
                root.complete();
                trace!(
                    "block_on finished with {} task(s) still alive",
                    self.executor.live_tasks()
                );
                return output;
            }

            root.end_pending();
        }

        panic!(
            "block_on stalled: the root future and {} spawned task(s) are suspended with nothing left to wake them",
            self.executor.live_tasks()
        );
    }
}
