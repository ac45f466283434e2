use super::JoinHandle;
use super::waker::{TaskWaker, make_waker};
use crate::runtime::context::current_executor;

use std::cell::RefCell;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

/// A unit of work the executor can poll.
///
/// The trait erases the output type of a task so the executor can keep a
/// heterogeneous collection of tasks behind `Rc<dyn Runnable>`.
pub(crate) trait Runnable {
    /// Polls the task once if it is queued.
    ///
    /// Returns `true` once the task has completed and can be discarded.
    fn run(&self) -> bool;
}

/// A spawned asynchronous task.
///
/// A `Task` owns a `Future` together with the result it produced and the
/// wakers of the `JoinHandle`s awaiting that result. Scheduling state lives
/// in the shared [`TaskWaker`] header.
pub(crate) struct Task<T> {
    /// The underlying future, dropped as soon as it completes.
    future: RefCell<Option<Pin<Box<dyn Future<Output = T>>>>>,

    /// Result produced by the future, until a `JoinHandle` takes it.
    pub(crate) result: RefCell<Option<T>>,

    /// Scheduling header shared with every waker of this task.
    pub(crate) header: Arc<TaskWaker>,

    /// Waker handed to the future on every poll.
    waker: Waker,

    /// Wakers of `JoinHandle`s waiting for completion.
    pub(crate) waiters: RefCell<Vec<Waker>>,
}

impl<T> Task<T> {
    /// Creates a task around `future` with an already queued header.
    pub(crate) fn new<F>(future: F, header: Arc<TaskWaker>) -> Self
    where
        F: Future<Output = T> + 'static,
    {
        Self {
            future: RefCell::new(Some(Box::pin(future))),
            result: RefCell::new(None),
            waker: make_waker(header.clone()),
            header,
            waiters: RefCell::new(Vec::new()),
        }
    }
}

impl<T> Runnable for Task<T> {
    /// Transitions the task to `RUNNING`, polls the inner future and handles
    /// the outcome:
    /// - `Poll::Pending`: back to `IDLE`, or re-queued if woken meanwhile.
    /// - `Poll::Ready`: stores the result and wakes every `JoinHandle`.
    fn run(&self) -> bool {
        if !self.header.begin_poll() {
            return self.header.is_complete();
        }

        let mut cx = Context::from_waker(&self.waker);

        let poll = match self.future.borrow_mut().as_mut() {
            Some(future) => future.as_mut().poll(&mut cx),
            None => return true,
        };

        match poll {
            Poll::Pending => {
                self.header.end_pending();
                false
            }
            Poll::Ready(value) => {
                self.future.borrow_mut().take();
                *self.result.borrow_mut() = Some(value);
                self.header.complete();

                for waiter in self.waiters.borrow_mut().drain(..) {
                    waiter.wake();
                }
                true
            }
        }
    }
}

/// Spawns a future as a task onto the current runtime.
///
/// The task is queued behind every task that is already runnable and starts
/// running the next time the current task yields.
///
/// # Panics
///
/// Panics if called outside the context of a running runtime.
///
/// # Examples
///
/// ```rust
/// use baton::{RuntimeBuilder, task};
///
/// let runtime = RuntimeBuilder::new().build();
/// let sum = runtime.block_on(async {
///     let handle = task::spawn(async { 20 + 22 });
///     handle.await
/// });
/// assert_eq!(sum, 42);
/// ```
pub fn spawn<F, T>(future: F) -> JoinHandle<T>
where
    F: Future<Output = T> + 'static,
    T: 'static,
{
    current_executor()
        .expect("spawn must be called within the context of a runtime")
        .spawn(future)
}
