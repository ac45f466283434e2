use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A future that yields execution back to the executor exactly once.
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    /// On the first poll, wakes itself and returns `Poll::Pending`, which
    /// puts the task at the back of the run queue. On the second poll, the
    /// future completes.
    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if !self.0 {
            self.0 = true;
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }

        Poll::Ready(())
    }
}

/// Yields execution back to the executor.
///
/// Every task that is already runnable gets polled before the current task
/// continues. This is the explicit suspension point cooperative tasks use
/// to let others make progress.
///
/// # Examples
///
/// ```rust
/// #[baton::main]
/// async fn main() {
///     baton::yield_now().await;
/// }
/// ```
pub async fn yield_now() {
    YieldOnce(false).await
}
