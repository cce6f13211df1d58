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

//! A data-owning mutex with scoped acquisition and bounded locking.

use super::error::SyncError;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{PoisonError, TryLockError};
use std::thread;
use std::time::{Duration, Instant};

/// The longest sleep between two attempts of [`Mutex::try_lock_for`].
const MAX_BACKOFF: Duration = Duration::from_millis(1);

/// A mutual-exclusion lock protecting a value of type `T`.
///
/// Creating the mutex is [`Mutex::new`]; destroying it is dropping it (or
/// [`Mutex::into_inner`]). The lock is only reachable through a [`MutexGuard`],
/// so it is released on every exit path, including early returns, `?` and
/// unwinding, and it cannot be released by someone who does not hold it.
///
/// A panic while the lock is held does not make the data unreachable: the poisoned
/// state is recovered and a warning is logged. Panicking critical sections in this
/// engine are task bodies, which never run while holding an engine lock.
pub struct Mutex<T: ?Sized> {
    inner: std::sync::Mutex<T>,
}

/// Scoped ownership of a [`Mutex`]'s lock. Dropping the guard unlocks.
#[must_use = "if unused the Mutex will immediately unlock"]
pub struct MutexGuard<'a, T: ?Sized + 'a> {
    pub(super) inner: std::sync::MutexGuard<'a, T>,
}

impl<T> Mutex<T> {
    /// Creates an unlocked mutex holding `value`.
    pub const fn new(value: T) -> Self {
        Self {
            inner: std::sync::Mutex::new(value),
        }
    }

    /// Consumes the mutex and returns the protected value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner().unwrap_or_else(|poisoned| {
            log::warn!("Mutex was poisoned by a panicking holder; recovering its data.");
            poisoned.into_inner()
        })
    }
}

impl<T: ?Sized> Mutex<T> {
    /// Blocks the calling thread until the lock is acquired.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        let inner = self.inner.lock().unwrap_or_else(recover);
        MutexGuard { inner }
    }

    /// Attempts to acquire the lock without blocking.
    ///
    /// Returns `None` if another thread holds it.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        match self.inner.try_lock() {
            Ok(inner) => Some(MutexGuard { inner }),
            Err(TryLockError::Poisoned(poisoned)) => Some(MutexGuard {
                inner: recover(poisoned),
            }),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Attempts to acquire the lock, giving up after `timeout`.
    ///
    /// Retries with an exponential backoff capped at one millisecond.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::LockTimeout`] if the lock was not acquired in time.
    pub fn try_lock_for(&self, timeout: Duration) -> Result<MutexGuard<'_, T>, SyncError> {
        let deadline = Instant::now() + timeout;
        let mut backoff = Duration::from_micros(20);

        loop {
            if let Some(guard) = self.try_lock() {
                return Ok(guard);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(SyncError::LockTimeout { timeout });
            }
            thread::sleep(backoff.min(deadline - now));
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }

    /// Returns a mutable reference to the data; no locking is needed with `&mut self`.
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut().unwrap_or_else(recover)
    }
}

impl<'a, T: ?Sized> MutexGuard<'a, T> {
    /// Releases the lock. Equivalent to dropping the guard.
    pub fn unlock(guard: Self) {
        drop(guard);
    }
}

impl<T: ?Sized> Deref for MutexGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: ?Sized> DerefMut for MutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<T: Default> Default for Mutex<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> From<T> for Mutex<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Mutex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Mutex");
        match self.try_lock() {
            Some(guard) => d.field("data", &&*guard),
            None => d.field("data", &format_args!("<locked>")),
        };
        d.finish_non_exhaustive()
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for MutexGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

fn recover<G>(poisoned: PoisonError<G>) -> G {
    log::warn!("Mutex was poisoned by a panicking holder; recovering its data.");
    poisoned.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn lock_gives_access_and_releases_on_scope_exit() {
        let mutex = Mutex::new(0);
        {
            let mut guard = mutex.lock();
            *guard += 1;
        }
        assert!(mutex.try_lock().is_some());
        assert_eq!(mutex.into_inner(), 1);
    }

    #[test]
    fn try_lock_on_unlocked_mutex_succeeds_and_holds() {
        let mutex = Arc::new(Mutex::new(()));
        let guard = mutex.try_lock().expect("unlocked mutex should be acquired");

        let contender = Arc::clone(&mutex);
        let acquired_elsewhere = thread::spawn(move || contender.try_lock().is_some())
            .join()
            .unwrap();
        assert!(!acquired_elsewhere, "second try_lock must fail while held");

        MutexGuard::unlock(guard);

        let contender = Arc::clone(&mutex);
        let acquired_after_unlock = thread::spawn(move || contender.try_lock().is_some())
            .join()
            .unwrap();
        assert!(acquired_after_unlock);
    }

    #[test]
    fn try_lock_for_times_out_while_held() {
        let mutex = Mutex::new(5);
        let _held = mutex.lock();

        thread::scope(|scope| {
            let waiter = scope.spawn(|| {
                let start = Instant::now();
                let result = mutex.try_lock_for(Duration::from_millis(30));
                (result.map(|_| ()), start.elapsed())
            });
            let (result, elapsed) = waiter.join().unwrap();
            assert_eq!(
                result,
                Err(SyncError::LockTimeout {
                    timeout: Duration::from_millis(30)
                })
            );
            assert!(elapsed >= Duration::from_millis(30));
        });
    }

    #[test]
    fn try_lock_for_acquires_once_released() {
        let mutex = Arc::new(Mutex::new(0u32));
        let guard = mutex.lock();

        let waiter = {
            let mutex = Arc::clone(&mutex);
            thread::spawn(move || {
                let mut value = mutex
                    .try_lock_for(Duration::from_secs(2))
                    .expect("lock should be released well before the timeout");
                *value += 1;
            })
        };

        thread::sleep(Duration::from_millis(10));
        drop(guard);
        waiter.join().unwrap();
        assert_eq!(*mutex.lock(), 1);
    }

    #[test]
    fn poisoned_mutex_is_recovered() {
        let mutex = Arc::new(Mutex::new(vec![1, 2]));
        let poisoner = Arc::clone(&mutex);
        let result = thread::spawn(move || {
            let mut guard = poisoner.lock();
            guard.push(3);
            panic!("holder panicked");
        })
        .join();
        assert!(result.is_err());

        assert_eq!(*mutex.lock(), vec![1, 2, 3]);
        assert!(mutex.try_lock().is_some());
    }

    #[test]
    fn lock_serializes_concurrent_increments() {
        let counter = Arc::new(Mutex::new(0usize));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        *counter.lock() += 1;
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(*counter.lock(), 4_000);
    }
}
