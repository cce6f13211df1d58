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

//! # Kiln Core
//!
//! Foundational crate containing the synchronization primitives, buffer
//! allocation contract, fixed-capacity collections and input event types
//! shared by the rest of the engine.
//!
//! Nothing in this crate owns global state: every buffer is created through an
//! explicit [`memory::BufferAllocator`] handed in by the caller.

#![warn(missing_docs)]

pub mod collections;
pub mod event;
pub mod memory;
pub mod sync;

pub use event::{Event, EventKind, EventQueue, KeyCode, MouseButton};
pub use memory::{AllocError, BufferAllocator, SystemAllocator, TrackingAllocator};
pub use sync::{Condvar, Mutex, MutexGuard, StopToken, SyncError, Thread, ThreadError};
