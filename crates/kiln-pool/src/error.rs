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

//! Error types for the worker pool.

use crate::pool::WorkerPanicked;
use kiln_core::memory::AllocError;
use kiln_core::sync::ThreadError;
use std::error::Error;
use std::fmt;
use std::time::Duration;

/// An error raised by the [`WorkerPool`](crate::WorkerPool).
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// The task store already held `capacity` pending tasks.
    ///
    /// Produced from a [`PushError`] with `?`, once the caller has decided not to
    /// retry the rejected task.
    #[error("task store is full ({capacity} tasks pending)")]
    Full {
        /// The store capacity.
        capacity: usize,
    },
    /// The configuration cannot produce a working pool.
    #[error("invalid pool configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        reason: &'static str,
    },
    /// A worker thread could not be spawned. The workers spawned before it were
    /// stopped and joined.
    #[error("failed to spawn worker {index}")]
    SpawnFailed {
        /// Index of the worker that failed to spawn.
        index: usize,
        /// The underlying thread error.
        #[source]
        source: ThreadError,
    },
    /// The task store could not be allocated.
    #[error("failed to allocate the task store")]
    Allocation(#[from] AllocError),
    /// Some workers were still running when the shutdown deadline passed and
    /// were detached. The pending tasks were dropped so that detached workers
    /// exit after their current task.
    #[error("{remaining} worker(s) still running after {timeout:?}; detached")]
    ShutdownTimeout {
        /// The number of detached workers.
        remaining: usize,
        /// The timeout that elapsed.
        timeout: Duration,
        /// Pending tasks dropped at the deadline.
        abandoned: usize,
        /// Workers joined before the deadline that had died from a propagated panic.
        died: Vec<WorkerPanicked>,
    },
}

/// A submission refused because the task store was full.
///
/// The rejected value is handed back: the caller decides whether to retry it
/// later or drop it. For [`WorkerPool::push`](crate::WorkerPool::push) it is the
/// [`Task`](crate::Task); for [`WorkerPool::push_fn`](crate::WorkerPool::push_fn)
/// it is the argument.
pub struct PushError<T> {
    capacity: usize,
    rejected: T,
}

impl<T> PushError<T> {
    pub(crate) fn new(capacity: usize, rejected: T) -> Self {
        Self { capacity, rejected }
    }

    /// The store capacity at the time of the rejection.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the rejected value.
    pub fn into_inner(self) -> T {
        self.rejected
    }
}

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushError")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task store is full ({} tasks pending)", self.capacity)
    }
}

impl<T> Error for PushError<T> {}

impl<T> From<PushError<T>> for PoolError {
    fn from(err: PushError<T>) -> Self {
        PoolError::Full {
            capacity: err.capacity,
        }
    }
}
