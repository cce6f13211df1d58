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

//! Named OS threads running a single entry function.

use super::error::ThreadError;
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};

/// A shared flag asking a thread to stop at its next check.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    flag: Arc<AtomicBool>,
}

impl StopToken {
    /// Creates a token in the "running" state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag. Idempotent.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns `true` once [`stop`](Self::stop) was called on any clone.
    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// A handle to an OS thread running one entry function.
///
/// Lifecycle:
/// - [`start`](Self::start) / [`spawn`](Self::spawn) create the thread;
/// - [`join`](Self::join) blocks until the entry function returns;
/// - [`destroy`](Self::destroy) releases the handle without waiting;
/// - [`terminate`](Self::terminate) is the last resort, see its documentation.
#[derive(Debug)]
pub struct Thread {
    name: String,
    handle: JoinHandle<()>,
    stop: StopToken,
}

impl Thread {
    /// Starts a thread named `name` that calls `entry(arg)`.
    ///
    /// # Errors
    ///
    /// See [`spawn`](Self::spawn).
    pub fn start<A, F>(name: impl Into<String>, entry: F, arg: A) -> Result<Self, ThreadError>
    where
        F: FnOnce(A) + Send + 'static,
        A: Send + 'static,
    {
        Self::spawn(name, move |_| entry(arg))
    }

    /// Starts a thread named `name` whose entry receives the thread's [`StopToken`].
    ///
    /// # Errors
    ///
    /// - [`ThreadError::InvalidName`] if `name` contains a NUL byte.
    /// - [`ThreadError::CreationFailed`] if the OS refuses to create the thread.
    pub fn spawn<F>(name: impl Into<String>, entry: F) -> Result<Self, ThreadError>
    where
        F: FnOnce(StopToken) + Send + 'static,
    {
        let name = name.into();
        if name.contains('\0') {
            return Err(ThreadError::InvalidName { name });
        }
        let stop = StopToken::new();
        let token = stop.clone();

        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || entry(token))
            .map_err(|source| ThreadError::CreationFailed {
                name: name.clone(),
                source,
            })?;

        log::trace!("Thread '{name}' started.");
        Ok(Self { name, handle, stop })
    }

    /// Blocks until the entry function returns.
    ///
    /// # Errors
    ///
    /// Returns [`ThreadError::Panicked`] if the entry function panicked.
    pub fn join(self) -> Result<(), ThreadError> {
        let Self { name, handle, .. } = self;
        handle.join().map_err(|payload| ThreadError::Panicked {
            message: panic_message(payload.as_ref()),
            name,
        })
    }

    /// Polls until the entry function has returned or `deadline` passes.
    ///
    /// Returns `true` if the thread finished in time; [`join`](Self::join) will
    /// then not block.
    pub fn wait_until(&self, deadline: Instant) -> bool {
        loop {
            if self.handle.is_finished() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::sleep((deadline - now).min(Duration::from_millis(1)));
        }
    }

    /// Abandons the thread.
    ///
    /// This is a last-resort operation, not a shutdown path. Safe Rust cannot
    /// kill a thread, so this raises the thread's [`StopToken`] and releases the
    /// handle immediately. An entry that never checks its token keeps running
    /// until the process exits, and nothing it owns is cleaned up before then.
    pub fn terminate(self) {
        log::warn!(
            "Thread '{}' terminated without joining; it exits at its next stop check.",
            self.name
        );
        self.stop.stop();
    }

    /// Releases the handle without joining. The thread keeps running detached.
    pub fn destroy(self) {
        log::trace!("Thread '{}' handle released.", self.name);
    }

    /// The thread's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The thread's OS-level identifier.
    pub fn id(&self) -> ThreadId {
        self.handle.thread().id()
    }

    /// Returns `true` if the entry function has returned.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// A clone of the token this thread's entry observes.
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }
}

/// Renders a panic payload as text.
///
/// Payloads raised by `panic!` are `&str` or `String`; anything else is reported
/// generically.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn start_passes_argument_to_entry() {
        let (tx, rx) = mpsc::channel();
        let thread = Thread::start(
            "kiln-test-arg",
            move |value: u32| tx.send(value * 2).unwrap(),
            21,
        )
        .unwrap();

        thread.join().unwrap();
        assert_eq!(rx.recv().unwrap(), 42);
    }

    #[test]
    fn thread_carries_its_name() {
        let thread = Thread::spawn("kiln-test-name", |_| {
            assert_eq!(thread::current().name(), Some("kiln-test-name"));
        })
        .unwrap();
        assert_eq!(thread.name(), "kiln-test-name");
        thread.join().unwrap();
    }

    #[test]
    fn nul_in_name_is_rejected() {
        match Thread::spawn("kiln\0test", |_| {}) {
            Err(ThreadError::InvalidName { name }) => assert_eq!(name, "kiln\0test"),
            other => panic!("expected an invalid name error, got {other:?}"),
        }
    }

    #[test]
    fn join_surfaces_panics() {
        let thread = Thread::spawn("kiln-test-panic", |_| panic!("boom")).unwrap();
        match thread.join() {
            Err(ThreadError::Panicked { name, message }) => {
                assert_eq!(name, "kiln-test-panic");
                assert_eq!(message, "boom");
            }
            other => panic!("expected a panic report, got {other:?}"),
        }
    }

    #[test]
    fn terminate_raises_stop_token() {
        let (tx, rx) = mpsc::channel();
        let thread = Thread::spawn("kiln-test-terminate", move |stop| {
            while !stop.is_stopped() {
                thread::sleep(Duration::from_millis(1));
            }
            tx.send(()).unwrap();
        })
        .unwrap();

        thread.terminate();
        rx.recv_timeout(Duration::from_secs(2))
            .expect("entry should observe the stop token");
    }

    #[test]
    fn wait_until_reports_finish() {
        let thread = Thread::spawn("kiln-test-wait", |_| {}).unwrap();
        assert!(thread.wait_until(Instant::now() + Duration::from_secs(2)));
        assert!(thread.is_finished());
        thread.join().unwrap();

        let blocked = Thread::spawn("kiln-test-wait-blocked", |stop| {
            while !stop.is_stopped() {
                thread::sleep(Duration::from_millis(1));
            }
        })
        .unwrap();
        assert!(!blocked.wait_until(Instant::now() + Duration::from_millis(10)));
        blocked.stop_token().stop();
        blocked.join().unwrap();
    }

    #[test]
    fn panic_message_handles_string_payloads() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("borrowed");
        let other: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(borrowed.as_ref()), "borrowed");
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }
}
