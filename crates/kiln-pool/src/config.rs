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

//! Worker pool configuration.

use serde::{Deserialize, Serialize};
use std::thread;

/// The order in which workers pick pending tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskOrder {
    /// Newest task first. Under sustained load the oldest tasks may starve.
    #[default]
    Lifo,
    /// Oldest task first.
    Fifo,
}

/// What a worker does when a task panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Catch the panic, send a [`TaskFailure`](crate::TaskFailure) on the
    /// failure channel and keep the worker alive.
    #[default]
    Isolate,
    /// Catch the panic, log it at error level and keep the worker alive.
    LogAndContinue,
    /// Log the panic and let it unwind the worker thread, which dies.
    /// The death is reported by [`WorkerPool::destroy`](crate::WorkerPool::destroy).
    Propagate,
}

/// What happens to pending tasks once the pool is stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShutdownPolicy {
    /// Workers stop picking tasks as soon as they observe the stop request.
    /// Whatever is still pending is dropped at destruction.
    #[default]
    Abandon,
    /// Workers keep picking tasks until the store is empty, then exit.
    Drain,
}

/// Configuration for a [`WorkerPool`](crate::WorkerPool).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of worker threads, fixed for the pool's lifetime.
    pub worker_count: usize,
    /// Maximum number of pending (accepted, not yet started) tasks.
    pub max_tasks: usize,
    /// The order in which pending tasks are picked.
    pub order: TaskOrder,
    /// How task panics are handled.
    pub failure_policy: FailurePolicy,
    /// How pending tasks are handled after [`stop`](crate::WorkerPool::stop).
    pub shutdown_policy: ShutdownPolicy,
    /// Capacity of the failure channel.
    /// If the channel is full, new failure reports are dropped.
    pub failure_buffer_size: usize,
    /// Worker threads are named `{thread_name_prefix}-{index}`.
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            max_tasks: 256,
            order: TaskOrder::default(),
            failure_policy: FailurePolicy::default(),
            shutdown_policy: ShutdownPolicy::default(),
            failure_buffer_size: 64,
            thread_name_prefix: "kiln-worker".to_string(),
        }
    }
}

impl PoolConfig {
    /// Sets the number of worker threads.
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Sets the maximum number of pending tasks.
    pub fn with_max_tasks(mut self, max_tasks: usize) -> Self {
        self.max_tasks = max_tasks;
        self
    }

    /// Sets the task pickup order.
    pub fn with_order(mut self, order: TaskOrder) -> Self {
        self.order = order;
        self
    }

    /// Sets the failure policy.
    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Sets the shutdown policy.
    pub fn with_shutdown_policy(mut self, shutdown_policy: ShutdownPolicy) -> Self {
        self.shutdown_policy = shutdown_policy;
        self
    }

    /// Sets the failure channel capacity.
    pub fn with_failure_buffer_size(mut self, failure_buffer_size: usize) -> Self {
        self.failure_buffer_size = failure_buffer_size;
        self
    }

    /// Sets the worker thread name prefix.
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Checks the values a pool cannot be created with.
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.worker_count == 0 {
            return Err("worker_count must be at least 1");
        }
        if self.max_tasks == 0 {
            return Err("max_tasks must be at least 1");
        }
        if self.failure_buffer_size == 0 {
            return Err("failure_buffer_size must be at least 1");
        }
        if self.thread_name_prefix.contains('\0') {
            return Err("thread_name_prefix must not contain NUL bytes");
        }
        Ok(())
    }

    pub(crate) fn worker_name(&self, index: usize) -> String {
        format!("{}-{index}", self.thread_name_prefix)
    }
}

/// One worker per core, leaving a core for the main thread.
fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(|cores| cores.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}
