use super::core::Runtime;

/// Initial capacity of the run queue and task table.
const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Builder for configuring and creating a runtime.
///
/// # Examples
///
/// ```rust
/// let runtime = baton::RuntimeBuilder::new()
///     .queue_capacity(16)
///     .build();
/// assert_eq!(runtime.block_on(async { 1 + 1 }), 2);
/// ```
pub struct RuntimeBuilder {
    /// Number of tasks the runtime can hold before its queues reallocate.
    queue_capacity: usize,
}

impl RuntimeBuilder {
    /// Creates a new `RuntimeBuilder` with default configuration.
    pub fn new() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// Sets how many tasks the run queue and task table can hold before
    /// reallocating. This is a sizing hint, not a limit.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn queue_capacity(mut self, n: usize) -> Self {
        assert!(n > 0, "queue_capacity must be > 0");

        self.queue_capacity = n;
        self
    }

    /// Builds the runtime with the configured options.
    pub fn build(self) -> Runtime {
        Runtime::new(self.queue_capacity)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
