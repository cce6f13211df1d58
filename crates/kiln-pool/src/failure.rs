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

//! Reports of panicking tasks.

use crossbeam_channel::{Sender, TrySendError};

/// A task panicked on a worker running under
/// [`FailurePolicy::Isolate`](crate::FailurePolicy::Isolate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    /// Index of the worker that ran the task.
    pub worker: usize,
    /// The task's label, if it had one.
    pub label: Option<&'static str>,
    /// The panic payload, rendered as text.
    pub message: String,
}

/// Sending half of the failure channel, shared by every worker.
#[derive(Debug, Clone)]
pub(crate) struct FailureSink {
    tx: Sender<TaskFailure>,
}

impl FailureSink {
    pub(crate) fn new(tx: Sender<TaskFailure>) -> Self {
        Self { tx }
    }

    /// Never blocks. A report that does not fit is logged and dropped.
    pub(crate) fn report(&self, failure: TaskFailure) {
        match self.tx.try_send(failure) {
            Ok(()) => {}
            Err(TrySendError::Full(failure)) => log::warn!(
                "Failure channel full, dropping report of task {:?} on worker {}: {}",
                failure.label,
                failure.worker,
                failure.message
            ),
            Err(TrySendError::Disconnected(failure)) => log::debug!(
                "Failure channel closed, dropping report of task {:?} on worker {}.",
                failure.label,
                failure.worker
            ),
        }
    }
}
