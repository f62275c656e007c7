//! Fixed-Capacity Offline Buffer
//!
//! ## Overview
//!
//! Readings that could not be delivered wait here until the link returns. The
//! buffer is a ring of `N` slots sized at compile time, so it lives inside the
//! session object with no heap behind it.
//!
//! ## Semantics
//!
//! - `head` is always the next write slot.
//! - `len <= N`.
//! - Pushing into a full buffer overwrites the logically oldest entry and
//!   hands it back to the caller. Eviction is the defined behavior under a
//!   long outage, not an error.
//! - Draining is oldest-first through [`OfflineBuffer::front`] /
//!   [`OfflineBuffer::pop_front`], so an entry is only removed once the caller
//!   is done with it.
//!
//! ### Memory Layout
//!
//! ```text
//! OfflineBuffer<_, 5> after 7 pushes (A..G):
//! ┌─────┬─────┬─────┬─────┬─────┐
//! │  F  │  G  │  C  │  D  │  E  │
//! └─────┴─────┴─────┴─────┴─────┘
//!             ↑
//!             head = 2 (next write, also the oldest entry when full)
//!
//! oldest slot = (head + N − len) % N
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use aeroguard_core::buffer::OfflineBuffer;
//!
//! let mut pending: OfflineBuffer<u32, 3> = OfflineBuffer::new();
//! for id in 1..=4 {
//!     pending.push(id);
//! }
//!
//! let ids: Vec<u32> = pending.iter().copied().collect();
//! assert_eq!(ids, [2, 3, 4]);
//! assert_eq!(pending.pop_front(), Some(2));
//! ```

use crate::constants::buffers::OFFLINE_BUFFER_CAPACITY;

/// Ring of pending entries with oldest-overwrite on overflow.
///
/// ## Thread Safety
///
/// Not synchronized. The session touches it from its single control loop only.
#[derive(Clone)]
pub struct OfflineBuffer<T: Copy, const N: usize = OFFLINE_BUFFER_CAPACITY> {
    /// `None` marks slots that were never written or have been drained
    data: [Option<T>; N],

    /// Next write slot
    head: usize,

    /// Number of live entries
    len: usize,
}

impl<T: Copy, const N: usize> OfflineBuffer<T, N> {
    const NON_ZERO_CAPACITY: () = assert!(N > 0, "offline buffer capacity must be non-zero");

    /// Empty buffer
    ///
    /// A zero capacity is rejected at compile time:
    ///
    /// ```compile_fail
    /// use aeroguard_core::buffer::OfflineBuffer;
    ///
    /// let _ = OfflineBuffer::<u32, 0>::new();
    /// ```
    pub const fn new() -> Self {
        let () = Self::NON_ZERO_CAPACITY;
        Self {
            data: [None; N],
            head: 0,
            len: 0,
        }
    }

    /// Append an entry, returning the one it evicted if the buffer was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.len == N { self.data[self.head].take() } else { None };

        self.data[self.head] = Some(item);
        self.head = (self.head + 1) % N;
        if self.len < N {
            self.len += 1;
        }

        evicted
    }

    /// Oldest entry, if any
    pub fn front(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        self.data[self.oldest_slot()].as_ref()
    }

    /// Remove and return the oldest entry.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let slot = self.oldest_slot();
        self.len -= 1;
        self.data[slot].take()
    }

    /// Newest entry, if any
    pub fn last(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        let idx = if self.head == 0 { N - 1 } else { self.head - 1 };
        self.data[idx].as_ref()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Fixed capacity `N`
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Next write slot
    pub fn head(&self) -> usize {
        self.head
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.data = [None; N];
        self.head = 0;
        self.len = 0;
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> OfflineBufferIter<'_, T, N> {
        OfflineBufferIter {
            buffer: self,
            index: 0,
        }
    }

    fn oldest_slot(&self) -> usize {
        (self.head + N - self.len) % N
    }

    /// Entry by logical index (0 = oldest).
    fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        self.data[(self.oldest_slot() + index) % N].as_ref()
    }
}

impl<T: Copy, const N: usize> Default for OfflineBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + core::fmt::Debug, const N: usize> core::fmt::Debug for OfflineBuffer<T, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Iterator over buffer contents, oldest first
pub struct OfflineBufferIter<'a, T: Copy, const N: usize> {
    buffer: &'a OfflineBuffer<T, N>,
    index: usize,
}

impl<'a, T: Copy, const N: usize> Iterator for OfflineBufferIter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.buffer.get(self.index)?;
        self.index += 1;
        Some(item)
    }
}
