//! Internal data structures.
//!
//! This module provides low-level utilities used internally by the runtime.
//! In particular, it exposes a [`Slab`] used to store spawned tasks under
//! small, reusable identifiers.

mod slab;

pub(crate) use slab::Slab;
