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

//! Error types for the synchronization primitives.

use std::time::Duration;

/// An error raised by a bounded lock acquisition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// The lock stayed held by someone else for the whole timeout.
    #[error("timed out after {timeout:?} waiting for a lock")]
    LockTimeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },
}

/// An error related to the lifecycle of a [`Thread`](super::Thread).
#[derive(Debug, thiserror::Error)]
pub enum ThreadError {
    /// The operating system refused to create the thread.
    #[error("failed to create thread '{name}': {source}")]
    CreationFailed {
        /// The name the thread would have had.
        name: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// The thread name contains a NUL byte, which OS thread names cannot hold.
    #[error("invalid thread name {name:?}: names must not contain NUL bytes")]
    InvalidName {
        /// The rejected name.
        name: String,
    },
    /// The thread's entry function panicked.
    #[error("thread '{name}' panicked: {message}")]
    Panicked {
        /// The name of the thread.
        name: String,
        /// The panic payload, rendered as text.
        message: String,
    },
}
