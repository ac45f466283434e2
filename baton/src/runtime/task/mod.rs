//! Asynchronous task primitives.
//!
//! This module defines how the runtime represents, schedules and executes
//! asynchronous tasks:
//! - task state management,
//! - custom waker integration,
//! - join handles for awaiting task completion,
//! - the core task and runnable abstractions.
//!
//! Most users only need [`spawn`] and [`JoinHandle`].

pub(crate) mod state;
pub(crate) mod waker;

mod core;
mod handle;

pub(crate) use self::core::{Runnable, Task};

pub use self::core::spawn;
pub use handle::JoinHandle;
