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

//! # Kiln Pool
//!
//! A fixed-size pool of worker threads executing fire-and-forget [`Task`]s.
//!
//! The pool owns a bounded task store, created once through a
//! [`BufferAllocator`](kiln_core::memory::BufferAllocator), and a set of named
//! worker threads that sleep on a condition variable until work arrives.
//! Submission never blocks: a full store rejects the task with a
//! [`PushError`] that hands it back for a later retry.
//!
//! ```no_run
//! use kiln_pool::{PoolConfig, Task, WorkerPool};
//!
//! let pool = WorkerPool::new(PoolConfig::default().with_worker_count(2))?;
//! pool.push(Task::labeled("load-mesh", || println!("loading...")))?;
//! pool.stop();
//! let report = pool.destroy()?;
//! println!("{} task(s) abandoned", report.abandoned);
//! # Ok::<(), kiln_pool::PoolError>(())
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod failure;
mod pool;
mod stats;
mod store;
mod task;
mod worker;

pub use config::{FailurePolicy, PoolConfig, ShutdownPolicy, TaskOrder};
pub use error::{PoolError, PushError};
pub use failure::TaskFailure;
pub use pool::{ShutdownReport, WorkerPanicked, WorkerPool};
pub use stats::PoolStats;
pub use task::Task;
