//! Core runtime components.
//!
//! This module contains a small single-threaded cooperative executor:
//! - executing asynchronous tasks on the current thread,
//! - a FIFO run queue fed by task wakers,
//! - the runtime context used by [`task::spawn`](crate::task::spawn),
//! - cooperative yielding.
//!
//! It exists to drive the primitives in [`sync`](crate::sync); it has no
//! I/O, no timers and no worker threads.

mod core;
mod executor;
mod queue;

pub(crate) mod builder;
pub(crate) mod context;
pub(crate) mod yield_now;

pub mod task;

pub use self::core::Runtime;
