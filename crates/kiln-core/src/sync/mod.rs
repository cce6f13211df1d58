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

//! Provides the threading and mutual-exclusion primitives of the engine.
//!
//! - [`Mutex`] guards data and releases its lock when the [`MutexGuard`] goes out
//!   of scope, on every exit path. It adds bounded acquisition
//!   ([`Mutex::try_lock_for`]) and transparent poison recovery on top of `std`.
//! - [`Condvar`] pairs with [`Mutex`] for blocking hand-offs between threads.
//! - [`Thread`] runs one entry function with one argument on a named OS thread,
//!   and reports creation failures and panics as [`ThreadError`]s.

mod condvar;
mod error;
mod mutex;
mod thread;

pub use self::condvar::Condvar;
pub use self::error::{SyncError, ThreadError};
pub use self::mutex::{Mutex, MutexGuard};
pub use self::thread::{panic_message, StopToken, Thread};
