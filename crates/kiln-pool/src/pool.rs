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

//! The worker pool handle.

use crate::config::PoolConfig;
use crate::error::{PoolError, PushError};
use crate::failure::{FailureSink, TaskFailure};
use crate::stats::PoolStats;
use crate::store::TaskStore;
use crate::task::Task;
use crate::worker::{self, Shared};
use crossbeam_channel::Receiver;
use kiln_core::memory::{BufferAllocator, SystemAllocator};
use kiln_core::sync::{Thread, ThreadError};
use std::mem;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A worker thread that died because a task panicked under
/// [`FailurePolicy::Propagate`](crate::FailurePolicy::Propagate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerPanicked {
    /// The worker thread's name.
    pub worker: String,
    /// The panic payload, rendered as text.
    pub message: String,
}

/// The outcome of a completed shutdown.
///
/// Once every worker is joined, `completed + failed + abandoned` equals the
/// number of accepted tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Tasks that ran to completion over the pool's lifetime.
    pub completed: u64,
    /// Tasks that panicked over the pool's lifetime.
    pub failed: u64,
    /// Accepted tasks that never started and were dropped.
    pub abandoned: usize,
    /// Workers that died from a propagated task panic.
    pub died: Vec<WorkerPanicked>,
}

/// A fixed set of worker threads executing tasks from a bounded store.
///
/// Lifecycle: [`new`](Self::new) spawns the workers, [`push`](Self::push)
/// submits work, [`stop`](Self::stop) asks the workers to exit and
/// [`destroy`](Self::destroy) joins them. Dropping the pool stops and joins too.
/// The worker count and the store capacity never change.
///
/// Tasks are picked in the configured [`TaskOrder`](crate::TaskOrder). With the
/// default LIFO order, the newest pending task runs first and older ones may
/// wait indefinitely while the pool stays saturated.
#[derive(Debug)]
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<Thread>,
    failures: Receiver<TaskFailure>,
    config: PoolConfig,
}

impl WorkerPool {
    /// Creates a pool whose task store comes from the system allocator.
    ///
    /// # Errors
    ///
    /// See [`with_allocator`](Self::with_allocator).
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        Self::with_allocator(config, Arc::new(SystemAllocator))
    }

    /// Creates a pool whose task store is reserved through `allocator`, then
    /// spawns its workers.
    ///
    /// # Errors
    ///
    /// - [`PoolError::InvalidConfig`] if a size in `config` is zero.
    /// - [`PoolError::Allocation`] if the task store cannot be reserved.
    /// - [`PoolError::SpawnFailed`] if a worker thread cannot be created. The
    ///   workers already running are stopped and joined first.
    pub fn with_allocator(
        config: PoolConfig,
        allocator: Arc<dyn BufferAllocator>,
    ) -> Result<Self, PoolError> {
        config
            .validate()
            .map_err(|reason| PoolError::InvalidConfig { reason })?;

        let store = TaskStore::new(config.max_tasks, config.order, allocator)?;
        let (failure_tx, failures) = crossbeam_channel::bounded(config.failure_buffer_size);
        let shared = Arc::new(Shared::new(
            store,
            FailureSink::new(failure_tx),
            config.failure_policy,
            config.shutdown_policy,
        ));

        let mut workers = Vec::with_capacity(config.worker_count);
        for index in 0..config.worker_count {
            let worker_shared = Arc::clone(&shared);
            let spawned = Thread::start(
                config.worker_name(index),
                move |index| worker::run(worker_shared, index),
                index,
            );
            match spawned {
                Ok(thread) => workers.push(thread),
                Err(source) => {
                    log::error!("Failed to spawn worker {index}: {source}");
                    shared.request_stop();
                    join_all(workers);
                    return Err(PoolError::SpawnFailed { index, source });
                }
            }
        }

        log::info!(
            "WorkerPool created: {} workers, {} task slots, {:?} order.",
            config.worker_count,
            config.max_tasks,
            config.order
        );

        Ok(Self {
            shared,
            workers,
            failures,
            config,
        })
    }

    /// Submits a task. Never blocks on the task store being full.
    ///
    /// A task pushed after [`stop`](Self::stop) is accepted but may never run.
    ///
    /// # Errors
    ///
    /// Returns a [`PushError`] holding the task if `max_tasks` tasks are already
    /// pending. The pending count is unchanged.
    pub fn push(&self, task: Task) -> Result<(), PushError<Task>> {
        self.submit(task, |task| task)
    }

    /// Submits `function(arg)` as a task.
    ///
    /// # Errors
    ///
    /// Returns a [`PushError`] holding `arg` if `max_tasks` tasks are already pending.
    pub fn push_fn<A>(&self, function: fn(A), arg: A) -> Result<(), PushError<A>>
    where
        A: Send + 'static,
    {
        self.submit(arg, move |arg| Task::with_arg(function, arg))
    }

    fn submit<V, F>(&self, value: V, build: F) -> Result<(), PushError<V>>
    where
        F: FnOnce(V) -> Task,
    {
        let mut state = self.shared.state.lock();
        if let Err(rejected) = state.store.push_with(value, build) {
            self.shared.counters.rejected();
            log::trace!("Task store full, rejected a task.");
            return Err(PushError::new(state.store.capacity(), rejected));
        }
        self.shared.counters.submitted();
        if self.shared.is_stopped() {
            log::debug!("Task accepted after stop was requested; it may never run.");
        }
        self.shared.work_available.notify_one();
        Ok(())
    }

    /// Asks every worker to exit and returns immediately.
    ///
    /// Running tasks are not interrupted. Under
    /// [`ShutdownPolicy::Abandon`](crate::ShutdownPolicy::Abandon) no further
    /// task is picked; under [`ShutdownPolicy::Drain`](crate::ShutdownPolicy::Drain)
    /// the workers first empty the store. Idempotent.
    pub fn stop(&self) {
        if self.shared.request_stop() {
            log::debug!("WorkerPool stop requested.");
        }
    }

    /// Stops the pool, joins every worker and frees the task store.
    ///
    /// # Errors
    ///
    /// This variant waits for as long as the running tasks take and does not
    /// fail; the `Result` matches [`destroy_timeout`](Self::destroy_timeout).
    pub fn destroy(mut self) -> Result<ShutdownReport, PoolError> {
        self.shutdown(None)
    }

    /// Like [`destroy`](Self::destroy), but waits at most `timeout` for the workers.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ShutdownTimeout`] if some workers were still running
    /// at the deadline. They are detached and exit after their current task; the
    /// pending tasks are dropped, even under
    /// [`ShutdownPolicy::Drain`](crate::ShutdownPolicy::Drain). The error carries
    /// the abandoned count and the workers found dead. Tasks still running on
    /// detached workers are in neither, so the accounting of [`ShutdownReport`]
    /// only holds on success.
    pub fn destroy_timeout(mut self, timeout: Duration) -> Result<ShutdownReport, PoolError> {
        self.shutdown(Some(timeout))
    }

    /// Blocks until no task is pending or running, for at most `timeout`.
    ///
    /// Returns `false` on timeout. After [`stop`](Self::stop) with the
    /// `Abandon` policy, leftover pending tasks keep the pool from ever
    /// becoming idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        while !state.is_idle() {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            state = self.shared.idle.wait_timeout(state, deadline - now).0;
        }
        true
    }

    /// The number of worker threads the pool was created with.
    pub fn worker_count(&self) -> usize {
        self.config.worker_count
    }

    /// The maximum number of pending tasks.
    pub fn capacity(&self) -> usize {
        self.shared.state.lock().store.capacity()
    }

    /// The number of accepted tasks no worker has picked yet.
    pub fn pending(&self) -> usize {
        self.shared.state.lock().store.len()
    }

    /// Returns `true` once [`stop`](Self::stop) was called.
    pub fn is_stopped(&self) -> bool {
        self.shared.is_stopped()
    }

    /// A snapshot of the task counters.
    pub fn stats(&self) -> PoolStats {
        self.shared.counters.snapshot()
    }

    /// The receiving end of the failure channel.
    ///
    /// Only [`FailurePolicy::Isolate`](crate::FailurePolicy::Isolate) sends on it.
    pub fn failures(&self) -> Receiver<TaskFailure> {
        self.failures.clone()
    }

    /// The configuration the pool was created with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    fn shutdown(&mut self, timeout: Option<Duration>) -> Result<ShutdownReport, PoolError> {
        self.stop();
        let workers = mem::take(&mut self.workers);

        let (finished, remaining) = match timeout {
            None => (workers, 0),
            Some(timeout) => {
                let deadline = Instant::now() + timeout;
                let (finished, stuck): (Vec<_>, Vec<_>) = workers
                    .into_iter()
                    .partition(|worker| worker.wait_until(deadline));
                let remaining = stuck.len();
                for worker in stuck {
                    log::warn!(
                        "Worker '{}' still busy at shutdown deadline; detaching.",
                        worker.name()
                    );
                    worker.destroy();
                }
                (finished, remaining)
            }
        };

        let died = join_all(finished);
        let abandoned = self.shared.state.lock().store.clear();

        if let Some(timeout) = timeout.filter(|_| remaining > 0) {
            log::warn!(
                "WorkerPool shutdown timed out: {remaining} worker(s) detached, {abandoned} task(s) abandoned."
            );
            return Err(PoolError::ShutdownTimeout {
                remaining,
                timeout,
                abandoned,
                died,
            });
        }

        let stats = self.stats();
        let report = ShutdownReport {
            completed: stats.completed,
            failed: stats.failed,
            abandoned,
            died,
        };
        log::info!(
            "WorkerPool destroyed: {} completed, {} failed, {} abandoned, {} worker(s) died.",
            report.completed,
            report.failed,
            report.abandoned,
            report.died.len()
        );
        Ok(report)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        match self.shutdown(None) {
            Ok(report) if !report.died.is_empty() => log::error!(
                "WorkerPool dropped with {} dead worker(s).",
                report.died.len()
            ),
            Ok(_) => {}
            Err(err) => log::error!("WorkerPool shutdown on drop failed: {err}"),
        }
    }
}

/// Joins `workers`, collecting those that died from a panic.
fn join_all(workers: Vec<Thread>) -> Vec<WorkerPanicked> {
    let mut died = Vec::new();
    for worker in workers {
        match worker.join() {
            Ok(()) => {}
            Err(ThreadError::Panicked { name, message }) => {
                died.push(WorkerPanicked {
                    worker: name,
                    message,
                });
            }
            Err(err) => log::error!("Failed to join worker: {err}"),
        }
    }
    died
}
