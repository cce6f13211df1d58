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

//! Allocator objects that gate and account for buffer creation.

use std::alloc::Layout;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// An error raised while reserving storage for a fixed-capacity buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
    /// A buffer was requested with a capacity of zero elements.
    #[error("buffer capacity must be greater than zero")]
    ZeroCapacity,
    /// The requested element count does not fit in a valid memory layout.
    #[error("a buffer of {capacity} elements overflows the addressable size")]
    CapacityOverflow {
        /// The element count that was requested.
        capacity: usize,
    },
    /// The heap could not provide the requested storage.
    #[error("out of memory while reserving {bytes} bytes")]
    OutOfMemory {
        /// The size of the failed reservation, in bytes.
        bytes: usize,
    },
    /// The allocator's byte budget does not cover the request.
    #[error("reserving {requested} bytes exceeds the remaining budget of {available} bytes")]
    BudgetExceeded {
        /// The size of the rejected reservation, in bytes.
        requested: usize,
        /// The number of bytes still available under the budget.
        available: usize,
    },
}

/// A snapshot of an allocator's accounting counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocatorStats {
    /// Bytes currently reserved by live buffers.
    pub current_bytes: usize,
    /// The highest value `current_bytes` ever reached.
    pub peak_bytes: usize,
    /// The number of successful reservations.
    pub reservations: u64,
    /// The number of releases.
    pub releases: u64,
}

impl AllocatorStats {
    /// The number of buffers reserved and not yet released.
    pub fn live_buffers(&self) -> u64 {
        self.reservations.saturating_sub(self.releases)
    }
}

/// The contract between fixed-capacity buffers and whoever owns their memory policy.
///
/// Implementations are shared between threads (a worker pool and the event queue
/// may be created from different places), hence the `Send + Sync` bound.
pub trait BufferAllocator: Send + Sync + Debug {
    /// Asks permission to create a buffer with the given layout.
    ///
    /// Returning an error aborts the buffer's construction; no memory is taken.
    fn reserve(&self, layout: Layout) -> Result<(), AllocError>;

    /// Records that a buffer previously admitted by [`reserve`](Self::reserve) was freed.
    fn release(&self, layout: Layout);

    /// Returns the allocator's accounting counters, if it keeps any.
    fn stats(&self) -> AllocatorStats {
        AllocatorStats::default()
    }
}

/// Admits every request and keeps no books. The default for engine buffers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

impl BufferAllocator for SystemAllocator {
    fn reserve(&self, _layout: Layout) -> Result<(), AllocError> {
        Ok(())
    }

    fn release(&self, _layout: Layout) {}
}

/// An allocator that tracks live bytes and optionally enforces a byte budget.
///
/// All counters are atomics, so a single instance can be shared by every buffer
/// of a subsystem (e.g. one per worker pool) without any additional locking.
#[derive(Debug, Default)]
pub struct TrackingAllocator {
    budget: Option<usize>,
    current_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
    reservations: AtomicU64,
    releases: AtomicU64,
}

impl TrackingAllocator {
    /// Creates a tracking allocator with no budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracking allocator that rejects reservations beyond `bytes` in total.
    pub fn with_budget(bytes: usize) -> Self {
        Self {
            budget: Some(bytes),
            ..Self::default()
        }
    }

    /// Returns the configured byte budget, if any.
    pub fn budget(&self) -> Option<usize> {
        self.budget
    }
}

impl BufferAllocator for TrackingAllocator {
    fn reserve(&self, layout: Layout) -> Result<(), AllocError> {
        let size = layout.size();
        let budget = self.budget.unwrap_or(usize::MAX);
        let result = self
            .current_bytes
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_add(size).filter(|total| *total <= budget)
            });

        match result {
            Ok(previous) => {
                self.peak_bytes.fetch_max(previous + size, Ordering::Relaxed);
                self.reservations.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(current) => {
                let available = budget.saturating_sub(current);
                log::warn!(
                    "TrackingAllocator: rejected reservation of {size} bytes ({available} bytes available)."
                );
                Err(AllocError::BudgetExceeded {
                    requested: size,
                    available,
                })
            }
        }
    }

    fn release(&self, layout: Layout) {
        let size = layout.size();
        let result = self
            .current_bytes
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_sub(size)
            });

        if result.is_err() {
            log::error!("TrackingAllocator: byte counter underflowed during release! Size: {size}");
        } else {
            self.releases.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn stats(&self) -> AllocatorStats {
        AllocatorStats {
            current_bytes: self.current_bytes.load(Ordering::Acquire),
            peak_bytes: self.peak_bytes.load(Ordering::Relaxed),
            reservations: self.reservations.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(size: usize) -> Layout {
        Layout::array::<u8>(size).unwrap()
    }

    #[test]
    fn system_allocator_admits_everything() {
        let allocator = SystemAllocator;
        assert!(allocator.reserve(bytes(1 << 20)).is_ok());
        allocator.release(bytes(1 << 20));
        assert_eq!(allocator.stats(), AllocatorStats::default());
    }

    #[test]
    fn tracking_allocator_counts_current_and_peak() {
        let allocator = TrackingAllocator::new();
        allocator.reserve(bytes(100)).unwrap();
        allocator.reserve(bytes(50)).unwrap();
        allocator.release(bytes(100));

        let stats = allocator.stats();
        assert_eq!(stats.current_bytes, 50);
        assert_eq!(stats.peak_bytes, 150);
        assert_eq!(stats.reservations, 2);
        assert_eq!(stats.releases, 1);
        assert_eq!(stats.live_buffers(), 1);
    }

    #[test]
    fn tracking_allocator_enforces_budget() {
        let allocator = TrackingAllocator::with_budget(128);
        allocator.reserve(bytes(100)).unwrap();

        let err = allocator.reserve(bytes(64)).unwrap_err();
        assert_eq!(
            err,
            AllocError::BudgetExceeded {
                requested: 64,
                available: 28
            }
        );
        // A rejected reservation leaves the books untouched.
        assert_eq!(allocator.stats().current_bytes, 100);
        assert_eq!(allocator.stats().reservations, 1);
    }

    #[test]
    fn tracking_allocator_ignores_unbalanced_release() {
        let allocator = TrackingAllocator::new();
        allocator.release(bytes(8));
        assert_eq!(allocator.stats().current_bytes, 0);
        assert_eq!(allocator.stats().releases, 0);
    }
}
