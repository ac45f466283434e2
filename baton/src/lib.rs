//! # Baton
//!
//! **Baton** is a token-checked asynchronous mutex for tasks running on a
//! cooperative, single-threaded scheduler, together with the small
//! executor needed to drive it.
//!
//! Acquiring the [`sync::Mutex`] yields a [`sync::Token`], and only that
//! token can release it. Like a relay baton, the lock is passed straight to
//! the next waiting task on release, strictly in arrival order, without ever
//! appearing free in between.
//!
//! The crate offers:
//!
//! - A **FIFO mutex** with ownership tokens and explicit misuse errors
//! - An **injectable token source** (random UUIDs by default)
//! - A **single-threaded cooperative runtime** with `spawn`, `block_on` and
//!   `yield_now`
//! - **Ergonomic macros**: `#[baton::main]`, `#[baton::test]` and `join!`
//!
//! ## Quick Start
//!
//! ```rust
//! use baton::sync::Mutex;
//! use baton::{task, yield_now};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! #[baton::main]
//! async fn main() {
//!     let mutex = Rc::new(Mutex::new());
//!     let counter = Rc::new(Cell::new(0));
//!
//!     let mut handles = Vec::new();
//!     for _ in 0..4 {
//!         let mutex = mutex.clone();
//!         let counter = counter.clone();
//!         handles.push(task::spawn(async move {
//!             let token = mutex.acquire().await;
//!             let seen = counter.get();
//!             yield_now().await;
//!             counter.set(seen + 1);
//!             mutex.release(token).unwrap();
//!         }));
//!     }
//!
//!     for handle in handles {
//!         handle.await;
//!     }
//!     assert_eq!(counter.get(), 4);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`sync`]: The token-checked mutex and its token sources
//! - [`task`]: Spawning tasks and awaiting their results

mod runtime;
mod utils;

pub mod sync;

pub use runtime::Runtime;
pub use runtime::builder::RuntimeBuilder;
pub use runtime::task;
pub use runtime::yield_now::yield_now;

pub use baton_macros::*;
