//! Synchronization primitives for Baton.
//!
//! The module provides a single primitive, [`Mutex`]: an asynchronous,
//! token-checked, FIFO mutual exclusion lock for tasks running on a
//! cooperative single-threaded scheduler.
//!
//! - [`Mutex::acquire`] grants the lock immediately when it is free and
//!   otherwise queues the caller; the returned [`Acquire`] future resolves to
//!   a [`Token`].
//! - [`Mutex::release`] checks the token and hands the lock to the oldest
//!   waiter, or frees it. Misuse is reported as a [`ReleaseError`].
//! - Tokens come from a [`TokenSource`]. [`RandomTokens`] (random UUIDs) is
//!   the default; [`SequentialTokens`] gives reproducible values.
//!
//! ## Design notes
//!
//! - The mutex does not spawn threads or tasks and works with any executor
//!   that polls on a single thread, including [`Runtime`](crate::Runtime).
//! - There is no cancellation API. Dropping an [`Acquire`] withdraws it.
//! - The lock is not reentrant and has no timeout.

mod error;
mod mutex;
mod token;

pub use error::ReleaseError;
pub use mutex::{Acquire, Mutex};
pub use token::{RandomTokens, SequentialTokens, Token, TokenSource};
