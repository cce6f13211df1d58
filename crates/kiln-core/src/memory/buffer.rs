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

//! RAII slot storage reserved through a [`BufferAllocator`].

use super::allocator::{AllocError, BufferAllocator};
use std::alloc::Layout;
use std::fmt;
use std::sync::Arc;

/// A fixed number of optional slots whose memory is admitted by a [`BufferAllocator`].
///
/// The slot count never changes after creation. Every slot starts empty. The
/// reservation is released back to the allocator when the buffer is dropped.
pub struct SlotBuffer<T> {
    slots: Box<[Option<T>]>,
    layout: Layout,
    allocator: Arc<dyn BufferAllocator>,
}

impl<T> SlotBuffer<T> {
    /// Reserves `capacity` empty slots through `allocator`.
    ///
    /// # Errors
    ///
    /// - [`AllocError::ZeroCapacity`] if `capacity` is zero.
    /// - [`AllocError::CapacityOverflow`] if the slots do not fit a valid layout.
    /// - Whatever the allocator returns from [`BufferAllocator::reserve`].
    /// - [`AllocError::OutOfMemory`] if the heap refuses the storage.
    pub fn new(capacity: usize, allocator: Arc<dyn BufferAllocator>) -> Result<Self, AllocError> {
        if capacity == 0 {
            return Err(AllocError::ZeroCapacity);
        }
        let layout = Layout::array::<Option<T>>(capacity)
            .map_err(|_| AllocError::CapacityOverflow { capacity })?;

        allocator.reserve(layout)?;

        let mut slots = Vec::new();
        if slots.try_reserve_exact(capacity).is_err() {
            allocator.release(layout);
            return Err(AllocError::OutOfMemory {
                bytes: layout.size(),
            });
        }
        slots.resize_with(capacity, || None);

        Ok(Self {
            slots: slots.into_boxed_slice(),
            layout,
            allocator,
        })
    }

    /// The number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The size in bytes reserved for this buffer.
    pub fn reserved_bytes(&self) -> usize {
        self.layout.size()
    }

    /// Returns a reference to the value in slot `index`, if occupied.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity()`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots[index].as_ref()
    }

    /// Moves the value out of slot `index`, leaving it empty.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity()`.
    #[inline]
    pub fn take(&mut self, index: usize) -> Option<T> {
        self.slots[index].take()
    }

    /// Stores `value` in slot `index` and returns the previous occupant.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity()`.
    #[inline]
    pub fn put(&mut self, index: usize, value: T) -> Option<T> {
        self.slots[index].replace(value)
    }

    /// Empties every slot. The reservation is kept.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// The allocator this buffer was reserved through.
    pub fn allocator(&self) -> &Arc<dyn BufferAllocator> {
        &self.allocator
    }
}

impl<T> Drop for SlotBuffer<T> {
    fn drop(&mut self) {
        self.allocator.release(self.layout);
    }
}

impl<T> fmt::Debug for SlotBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotBuffer")
            .field("capacity", &self.capacity())
            .field("reserved_bytes", &self.reserved_bytes())
            .finish()
    }
}
