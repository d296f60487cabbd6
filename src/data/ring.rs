//! Fixed-capacity ring buffer for rolling per-host samples.

/// A bounded, insertion-ordered buffer that overwrites its oldest entry
/// once full.
///
/// Storage grows up to `capacity` on the first pushes and is then reused in
/// place, so a push is O(1) and never reallocates after warm-up.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring<T> {
    buf: Vec<T>,
    /// Index of the oldest element once the buffer has wrapped.
    head: usize,
    capacity: usize,
}

impl<T: Copy> Ring<T> {
    /// Create an empty ring holding at most `capacity` items.
    ///
    /// A zero capacity is raised to one; configuration validation rejects it
    /// before an engine is ever built.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: Vec::with_capacity(capacity),
            head: 0,
            capacity,
        }
    }

    /// Append `value` as the newest item.
    ///
    /// Returns the evicted oldest item if the ring was full.
    pub fn push(&mut self, value: T) -> Option<T> {
        if self.buf.len() < self.capacity {
            self.buf.push(value);
            return None;
        }

        let evicted = std::mem::replace(&mut self.buf[self.head], value);
        self.head = (self.head + 1) % self.capacity;
        Some(evicted)
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        let (newer, older) = self.buf.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    /// The most recently pushed item.
    pub fn last(&self) -> Option<&T> {
        if self.buf.is_empty() {
            return None;
        }
        let idx = (self.head + self.buf.len() - 1) % self.buf.len();
        self.buf.get(idx)
    }

    /// Copy the contents out, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
