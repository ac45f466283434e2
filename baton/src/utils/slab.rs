/// Indexed storage with slot reuse.
///
/// A `Slab` stores values of type `T` in a contiguous array and hands out
/// small integer indices. Freed indices are recycled by later insertions,
/// which keeps task identifiers dense for the lifetime of a runtime.
///
/// Slots are plain `Option<T>`, so a stale index (for example one held by a
/// waker that outlived its task) simply reads as empty or as the slot's new
/// occupant. Callers must tolerate the latter; the runtime does, because a
/// spurious wake-up only causes an extra poll.
pub(crate) struct Slab<T> {
    /// Storage for items; `None` marks a free slot.
    items: Vec<Option<T>>,
    /// Stack of free indices that can be reused.
    free: Vec<usize>,
    /// Number of occupied slots.
    len: usize,
}

impl<T> Slab<T> {
    /// Creates an empty `Slab` with room for `capacity` items before the
    /// backing vector has to grow.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let slab = Slab::<i32>::with_capacity(16);
    /// ```
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Inserts a value into the slab and returns its index.
    ///
    /// The most recently freed slot is reused first; otherwise the value is
    /// appended.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let mut slab = Slab::with_capacity(1);
    /// let idx = slab.insert(42);
    /// ```
    pub(crate) fn insert(&mut self, item: T) -> usize {
        self.len += 1;

        match self.free.pop() {
            Some(index) => {
                self.items[index] = Some(item);
                index
            }
            None => {
                self.items.push(Some(item));
                self.items.len() - 1
            }
        }
    }

    /// Index the next call to [`insert`](Self::insert) will return.
    pub(crate) fn vacant_key(&self) -> usize {
        self.free.last().copied().unwrap_or(self.items.len())
    }

    /// Returns a reference to the value stored at `index`, if any.
    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index).and_then(Option::as_ref)
    }

    /// Removes and returns the value stored at `index`.
    ///
    /// Returns `None` if the slot is out of range or already free; the slab
    /// is left unchanged in that case.
    pub(crate) fn remove(&mut self, index: usize) -> Option<T> {
        let item = self.items.get_mut(index)?.take()?;

        self.free.push(index);
        self.len -= 1;

        Some(item)
    }

    /// Number of occupied slots.
    pub(crate) fn len(&self) -> usize {
        self.len
    }
}
