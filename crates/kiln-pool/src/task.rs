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

//! The unit of work executed by the pool.

use std::fmt;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// An owned, fire-and-forget unit of work.
///
/// A task runs at most once, on whichever worker picks it. It has no result and
/// cannot be cancelled once accepted. The optional label only shows up in logs
/// and failure reports.
pub struct Task {
    job: Job,
    label: Option<&'static str>,
}

impl Task {
    /// Wraps a closure.
    pub fn new<F>(job: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            job: Box::new(job),
            label: None,
        }
    }

    /// Wraps a function and the single argument it is called with.
    pub fn with_arg<A>(function: fn(A), arg: A) -> Self
    where
        A: Send + 'static,
    {
        Self::new(move || function(arg))
    }

    /// Wraps a closure and names it for diagnostics.
    pub fn labeled<F>(label: &'static str, job: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            job: Box::new(job),
            label: Some(label),
        }
    }

    /// The diagnostic label, if any.
    pub fn label(&self) -> Option<&'static str> {
        self.label
    }

    pub(crate) fn run(self) {
        (self.job)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    static CALLS: AtomicUsize = AtomicUsize::new(0);

    fn add_to_calls(amount: usize) {
        CALLS.fetch_add(amount, Ordering::SeqCst);
    }

    #[test]
    fn with_arg_calls_function_with_argument() {
        Task::with_arg(add_to_calls, 5).run();
        assert_eq!(CALLS.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn labeled_task_keeps_label() {
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        let task = Task::labeled("decode", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(task.label(), Some("decode"));
        assert_eq!(format!("{task:?}"), "Task { label: Some(\"decode\"), .. }");
        task.run();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert_eq!(Task::new(|| {}).label(), None);
    }
}
