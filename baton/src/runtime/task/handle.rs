use super::Task;

use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// A handle to a spawned task.
///
/// A `JoinHandle` resolves to the task's output once it has completed.
/// Dropping it does **not** cancel the task; it only discards the ability
/// to observe the result.
pub struct JoinHandle<T> {
    /// Shared reference to the underlying task.
    pub(crate) task: Rc<Task<T>>,
}

impl<T> JoinHandle<T> {
    /// Returns `true` if the task has run to completion.
    pub fn is_finished(&self) -> bool {
        self.task.header.is_complete()
    }
}

impl<T> Future for JoinHandle<T> {
    type Output = T;

    /// Returns the result if the task has completed, otherwise registers the
    /// current waker to be woken on completion.
    ///
    /// # Panics
    ///
    /// Panics if polled again after it returned `Poll::Ready`.
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        if let Some(value) = self.task.result.borrow_mut().take() {
            return Poll::Ready(value);
        }

        assert!(
            !self.task.header.is_complete(),
            "JoinHandle polled after completion"
        );

        self.task.waiters.borrow_mut().push(cx.waker().clone());
        Poll::Pending
    }
}
