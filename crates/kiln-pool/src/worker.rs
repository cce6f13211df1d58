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

//! State shared between the pool handle and its workers, and the worker loop.

use crate::config::{FailurePolicy, ShutdownPolicy};
use crate::failure::{FailureSink, TaskFailure};
use crate::stats::Counters;
use crate::store::TaskStore;
use crate::task::Task;
use kiln_core::sync::{panic_message, Condvar, Mutex};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Everything guarded by the pool mutex.
#[derive(Debug)]
pub(crate) struct State {
    pub(crate) store: TaskStore,
    /// Tasks picked by a worker and not finished yet.
    pub(crate) running: usize,
}

impl State {
    pub(crate) fn is_idle(&self) -> bool {
        self.running == 0 && self.store.is_empty()
    }
}

#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) state: Mutex<State>,
    /// Signalled when a task is stored or stop is requested.
    pub(crate) work_available: Condvar,
    /// Signalled when the pool becomes idle.
    pub(crate) idle: Condvar,
    stopped: AtomicBool,
    pub(crate) counters: Counters,
    failures: FailureSink,
    failure_policy: FailurePolicy,
    shutdown_policy: ShutdownPolicy,
}

impl Shared {
    pub(crate) fn new(
        store: TaskStore,
        failures: FailureSink,
        failure_policy: FailurePolicy,
        shutdown_policy: ShutdownPolicy,
    ) -> Self {
        Self {
            state: Mutex::new(State { store, running: 0 }),
            work_available: Condvar::new(),
            idle: Condvar::new(),
            stopped: AtomicBool::new(false),
            counters: Counters::default(),
            failures,
            failure_policy,
            shutdown_policy,
        }
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Raises the stop flag and wakes every sleeping worker.
    ///
    /// Returns `false` if stop had already been requested.
    pub(crate) fn request_stop(&self) -> bool {
        let first = !self.stopped.swap(true, Ordering::AcqRel);
        // Notify under the lock: a worker between its flag check and its wait
        // still holds the lock, so it cannot miss this wake-up.
        let _state = self.state.lock();
        self.work_available.notify_all();
        first
    }

    /// Blocks until a task can be picked, or returns `None` once the worker should exit.
    fn next_task(&self) -> Option<Task> {
        let mut state = self.state.lock();
        loop {
            if self.is_stopped()
                && (self.shutdown_policy == ShutdownPolicy::Abandon || state.store.is_empty())
            {
                return None;
            }
            if let Some(task) = state.store.pop() {
                state.running += 1;
                return Some(task);
            }
            state = self.work_available.wait(state);
        }
    }

    fn finish_task(&self) {
        let mut state = self.state.lock();
        state.running -= 1;
        if state.is_idle() {
            self.idle.notify_all();
        }
    }
}

/// Entry point of worker thread `index`.
pub(crate) fn run(shared: Arc<Shared>, index: usize) {
    log::info!("Worker {index} started.");

    while let Some(task) = shared.next_task() {
        execute(&shared, index, task);
    }

    log::info!("Worker {index} stopped.");
}

fn execute(shared: &Shared, worker: usize, task: Task) {
    let label = task.label();
    log::trace!("Worker {worker} picked task {label:?}.");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.run()));
    match outcome {
        Ok(()) => shared.counters.completed(),
        Err(_) => shared.counters.failed(),
    }
    shared.finish_task();

    let Err(payload) = outcome else {
        return;
    };
    let message = panic_message(payload.as_ref());

    match shared.failure_policy {
        FailurePolicy::Isolate => shared.failures.report(TaskFailure {
            worker,
            label,
            message,
        }),
        FailurePolicy::LogAndContinue => {
            log::error!("Task {label:?} panicked on worker {worker}: {message}");
        }
        FailurePolicy::Propagate => {
            log::error!("Task {label:?} panicked on worker {worker}, worker exits: {message}");
            panic::resume_unwind(payload);
        }
    }
}
