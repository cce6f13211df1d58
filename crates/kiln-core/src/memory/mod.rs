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

//! Provides the allocation contract for fixed-capacity engine buffers.
//!
//! Queues and task stores never reach for a process-wide allocation lock. Instead
//! the caller hands an explicit [`BufferAllocator`] to their constructors, and owns
//! its lifecycle. The allocator decides whether a buffer of a given [`Layout`] may
//! be created and records when it is released.
//!
//! [`SlotBuffer`] is the RAII storage built on top of that contract: it reserves
//! through the allocator on creation and releases on drop.
//!
//! [`Layout`]: std::alloc::Layout

mod allocator;
mod buffer;

pub use self::allocator::{
    AllocError, AllocatorStats, BufferAllocator, SystemAllocator, TrackingAllocator,
};
pub use self::buffer::SlotBuffer;
