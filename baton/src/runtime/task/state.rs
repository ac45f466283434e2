//! Scheduling states shared by a task and its waker.
//!
//! Transitions:
//!
//! ```text
//! IDLE --wake--> QUEUED --poll--> RUNNING --Pending--> IDLE
//!                                   |  \--wake--> NOTIFIED --Pending--> QUEUED
//!                                   \--Ready--> COMPLETED
//! ```

/// Task is suspended and not scheduled.
pub(crate) const IDLE: usize = 0;

/// Task identifier sits in the run queue.
pub(crate) const QUEUED: usize = 1;

/// Task is being polled by the executor.
pub(crate) const RUNNING: usize = 2;

/// Task's future returned `Poll::Ready`; it will not be polled again.
pub(crate) const COMPLETED: usize = 3;

/// Task was woken while being polled and must be re-queued afterwards.
pub(crate) const NOTIFIED: usize = 4;
