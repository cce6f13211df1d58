// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Fixed-capacity circular buffer.
//!
//! The [`RingBuffer`] is the single storage shape behind the input event queue
//! (read from the front) and the worker pool's task store (read from the front
//! or the back, depending on the configured order).
//!
//! # Layout
//!
//! ```text
//! capacity = 5, after pushing A B C D and popping A from the front:
//!
//!   index:   0   1   2   3   4
//!          [ _ | B | C | D | _ ]
//!                ^       ^
//!              front    rear        count = 3
//!
//! the next push lands at (rear + 1) % capacity = 4, then wraps to 0.
//! ```

use crate::memory::{AllocError, BufferAllocator, SlotBuffer};
use std::fmt;
use std::sync::Arc;

/// A circular buffer with a capacity fixed at creation.
///
/// Writes go to `rear + 1` (modulo capacity). Reads come from `front` (FIFO) or from
/// `rear` (LIFO). A push into a full buffer is refused and hands the value back
/// without touching any state.
///
/// # Invariants
///
/// - `0 <= len() <= capacity()`
/// - `front()` and `rear()` always lie in `[0, capacity)`; `rear()` is `None`
///   only before the first write (or after [`clear`](Self::clear)).
/// - `front == (rear + 1 - len) mod capacity` whenever `rear` is set.
pub struct RingBuffer<T> {
    slots: SlotBuffer<T>,
    front: usize,
    rear: Option<usize>,
    count: usize,
}

impl<T> RingBuffer<T> {
    /// Creates an empty ring able to hold `capacity` values.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if `capacity` is zero or the allocator refuses the storage.
    pub fn with_capacity(
        capacity: usize,
        allocator: Arc<dyn BufferAllocator>,
    ) -> Result<Self, AllocError> {
        Ok(Self {
            slots: SlotBuffer::new(capacity, allocator)?,
            front: 0,
            rear: None,
            count: 0,
        })
    }

    /// The maximum number of values the ring holds.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// The number of live values.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the ring holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns `true` if a push would be refused.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Index of the next value [`pop_front`](Self::pop_front) would return.
    pub fn front(&self) -> usize {
        self.front
    }

    /// Index of the last write, or `None` if nothing was written yet.
    pub fn rear(&self) -> Option<usize> {
        self.rear
    }

    /// Appends `value` after the current rear.
    ///
    /// # Errors
    ///
    /// Returns `Err(value)` unchanged if the ring is full.
    pub fn push_back(&mut self, value: T) -> Result<(), T> {
        self.push_back_with(value, |value| value)
    }

    /// Like [`push_back`](Self::push_back), but `build` turns `input` into the
    /// stored value only once a free slot is certain.
    ///
    /// # Errors
    ///
    /// Returns `Err(input)` unchanged if the ring is full; `build` is not called.
    pub fn push_back_with<V, F>(&mut self, input: V, build: F) -> Result<(), V>
    where
        F: FnOnce(V) -> T,
    {
        if self.is_full() {
            return Err(input);
        }
        let index = self.next_write_index();
        self.slots.put(index, build(input));
        self.rear = Some(index);
        self.count += 1;
        Ok(())
    }

    /// Removes and returns the oldest value.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let value = self.slots.take(self.front);
        self.front = (self.front + 1) % self.capacity();
        self.count -= 1;
        value
    }

    /// Removes and returns the newest value.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let rear = self.rear?;
        let value = self.slots.take(rear);
        self.rear = Some((rear + self.capacity() - 1) % self.capacity());
        self.count -= 1;
        value
    }

    /// Returns a reference to the oldest value without removing it.
    pub fn peek_front(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        self.slots.get(self.front)
    }

    /// Returns a reference to the newest value without removing it.
    pub fn peek_back(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        self.rear.and_then(|rear| self.slots.get(rear))
    }

    /// Iterates over the live values from front to rear.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let capacity = self.capacity();
        (0..self.count).filter_map(move |offset| self.slots.get((self.front + offset) % capacity))
    }

    /// Drops every value and resets the indices to their initial state.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.front = 0;
        self.rear = None;
        self.count = 0;
    }

    fn next_write_index(&self) -> usize {
        match self.rear {
            Some(rear) => (rear + 1) % self.capacity(),
            None => self.front,
        }
    }
}

impl<T> fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("front", &self.front)
            .field("rear", &self.rear)
            .field("count", &self.count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{SystemAllocator, TrackingAllocator};

    fn ring<T>(capacity: usize) -> RingBuffer<T> {
        RingBuffer::with_capacity(capacity, Arc::new(SystemAllocator)).unwrap()
    }

    #[test]
    fn starts_empty_with_unset_rear() {
        let ring = ring::<u32>(4);
        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), 4);
        assert_eq!(ring.front(), 0);
        assert_eq!(ring.rear(), None);
    }

    #[test]
    fn fifo_order_is_preserved() {
        let mut ring = ring(3);
        ring.push_back('a').unwrap();
        ring.push_back('b').unwrap();
        ring.push_back('c').unwrap();

        assert_eq!(ring.pop_front(), Some('a'));
        assert_eq!(ring.pop_front(), Some('b'));
        assert_eq!(ring.pop_front(), Some('c'));
        assert_eq!(ring.pop_front(), None);
    }

    #[test]
    fn lifo_order_from_the_back() {
        let mut ring = ring(3);
        for n in 1..=3 {
            ring.push_back(n).unwrap();
        }
        assert_eq!(ring.pop_back(), Some(3));
        assert_eq!(ring.pop_back(), Some(2));
        ring.push_back(4).unwrap();
        assert_eq!(ring.pop_back(), Some(4));
        assert_eq!(ring.pop_back(), Some(1));
        assert_eq!(ring.pop_back(), None);
    }

    #[test]
    fn full_ring_hands_value_back_without_mutation() {
        let mut ring = ring(2);
        ring.push_back(10).unwrap();
        ring.push_back(20).unwrap();

        let (front, rear, len) = (ring.front(), ring.rear(), ring.len());
        assert_eq!(ring.push_back(30), Err(30));
        assert_eq!((ring.front(), ring.rear(), ring.len()), (front, rear, len));
        assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec![10, 20]);
    }

    #[test]
    fn push_back_with_builds_only_when_a_slot_is_free() {
        let mut ring = ring::<String>(1);
        assert_eq!(ring.push_back_with(7, |n| n.to_string()), Ok(()));

        let mut built = false;
        let rejected = ring.push_back_with(8, |n| {
            built = true;
            n.to_string()
        });
        assert_eq!(rejected, Err(8));
        assert!(!built);
        assert_eq!(ring.pop_front().as_deref(), Some("7"));
    }

    #[test]
    fn indices_wrap_around() {
        let mut ring = ring(3);
        for round in 0..10 {
            ring.push_back(round).unwrap();
            assert_eq!(ring.pop_front(), Some(round));
            assert!(ring.front() < 3);
            assert!(ring.rear().unwrap() < 3);
        }
        assert_eq!(ring.front(), 10 % 3);
        assert_eq!(ring.rear(), Some(9 % 3));
    }

    #[test]
    fn mixed_ends_keep_front_rear_invariant() {
        let mut ring = ring(4);
        for n in 0..4 {
            ring.push_back(n).unwrap();
        }
        assert_eq!(ring.pop_front(), Some(0));
        assert_eq!(ring.pop_back(), Some(3));
        ring.push_back(7).unwrap();
        ring.push_back(8).unwrap();

        let rear = ring.rear().unwrap();
        assert_eq!(ring.front(), (rear + 1 + 4 - ring.len()) % 4);
        assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec![1, 2, 7, 8]);
        assert_eq!(ring.peek_front(), Some(&1));
        assert_eq!(ring.peek_back(), Some(&8));
    }

    #[test]
    fn clear_resets_state_but_keeps_reservation() {
        let tracker = Arc::new(TrackingAllocator::new());
        let mut ring = RingBuffer::with_capacity(8, tracker.clone()).unwrap();
        ring.push_back(String::from("x")).unwrap();
        ring.clear();

        assert!(ring.is_empty());
        assert_eq!(ring.rear(), None);
        assert_eq!(tracker.stats().live_buffers(), 1);

        drop(ring);
        assert_eq!(tracker.stats().live_buffers(), 0);
    }
}
