use crate::runtime::executor::Executor;

use std::cell::RefCell;
use std::rc::Rc;

thread_local! {
    /// Executor driving the current thread, if any.
    ///
    /// Set for the duration of [`Runtime::block_on`](super::Runtime::block_on)
    /// so that [`task::spawn`](crate::task::spawn) can reach the executor
    /// without explicit parameter passing.
    static CURRENT_EXECUTOR: RefCell<Option<Rc<Executor>>> = const { RefCell::new(None) };
}

/// Restores the previous runtime context when dropped.
pub(crate) struct ContextGuard {
    previous: Option<Rc<Executor>>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT_EXECUTOR.with(|current| current.replace(previous));
    }
}

/// Enters the runtime execution context for the current thread.
///
/// The context stays installed until the returned guard is dropped, which
/// also happens while unwinding from a panic.
pub(crate) fn enter_context(executor: Rc<Executor>) -> ContextGuard {
    let previous = CURRENT_EXECUTOR.with(|current| current.replace(Some(executor)));
    ContextGuard { previous }
}

/// Returns the executor of the current runtime context.
pub(crate) fn current_executor() -> Option<Rc<Executor>> {
    CURRENT_EXECUTOR.with(|current| current.borrow().clone())
}
