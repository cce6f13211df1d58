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

//! Condition variable paired with the engine [`Mutex`](super::Mutex).

use super::mutex::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;

/// Blocks threads until another thread signals a change to mutex-protected state.
///
/// Waiting atomically releases the guard's lock and re-acquires it before
/// returning. Spurious wake-ups are possible, so callers re-check their
/// condition in a loop or use [`wait_while`](Self::wait_while).
#[derive(Debug, Default)]
pub struct Condvar {
    inner: std::sync::Condvar,
}

impl Condvar {
    /// Creates a condition variable with no waiters.
    pub const fn new() -> Self {
        Self {
            inner: std::sync::Condvar::new(),
        }
    }

    /// Releases `guard` and blocks until notified.
    pub fn wait<'a, T>(&self, guard: MutexGuard<'a, T>) -> MutexGuard<'a, T> {
        let inner = self
            .inner
            .wait(guard.inner)
            .unwrap_or_else(PoisonError::into_inner);
        MutexGuard { inner }
    }

    /// Blocks while `condition` returns `true` for the protected value.
    pub fn wait_while<'a, T, F>(&self, guard: MutexGuard<'a, T>, condition: F) -> MutexGuard<'a, T>
    where
        F: FnMut(&mut T) -> bool,
    {
        let inner = self
            .inner
            .wait_while(guard.inner, condition)
            .unwrap_or_else(PoisonError::into_inner);
        MutexGuard { inner }
    }

    /// Like [`wait`](Self::wait), but gives up after `timeout`.
    ///
    /// The returned flag is `true` if the wait timed out.
    pub fn wait_timeout<'a, T>(
        &self,
        guard: MutexGuard<'a, T>,
        timeout: Duration,
    ) -> (MutexGuard<'a, T>, bool) {
        let (inner, result) = self
            .inner
            .wait_timeout(guard.inner, timeout)
            .unwrap_or_else(PoisonError::into_inner);
        (MutexGuard { inner }, result.timed_out())
    }

    /// Wakes one waiting thread.
    pub fn notify_one(&self) {
        self.inner.notify_one();
    }

    /// Wakes every waiting thread.
    pub fn notify_all(&self) {
        self.inner.notify_all();
    }
}
