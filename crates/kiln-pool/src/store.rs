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

//! The bounded store of pending tasks.

use crate::config::TaskOrder;
use crate::task::Task;
use kiln_core::collections::RingBuffer;
use kiln_core::memory::{AllocError, BufferAllocator};
use std::sync::Arc;

/// Pending tasks in a fixed-capacity ring, read from the back (LIFO) or the
/// front (FIFO). Not synchronized; the pool keeps it behind its mutex.
#[derive(Debug)]
pub(crate) struct TaskStore {
    ring: RingBuffer<Task>,
    order: TaskOrder,
}

impl TaskStore {
    pub(crate) fn new(
        capacity: usize,
        order: TaskOrder,
        allocator: Arc<dyn BufferAllocator>,
    ) -> Result<Self, AllocError> {
        Ok(Self {
            ring: RingBuffer::with_capacity(capacity, allocator)?,
            order,
        })
    }

    /// Stores `build(value)` if a slot is free, otherwise hands `value` back.
    pub(crate) fn push_with<V, F>(&mut self, value: V, build: F) -> Result<(), V>
    where
        F: FnOnce(V) -> Task,
    {
        self.ring.push_back_with(value, build)
    }

    pub(crate) fn pop(&mut self) -> Option<Task> {
        match self.order {
            TaskOrder::Lifo => self.ring.pop_back(),
            TaskOrder::Fifo => self.ring.pop_front(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.ring.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Drops every pending task and returns how many there were.
    pub(crate) fn clear(&mut self) -> usize {
        let pending = self.ring.len();
        self.ring.clear();
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::memory::SystemAllocator;
    use std::sync::Mutex;

    fn store(order: TaskOrder) -> TaskStore {
        TaskStore::new(4, order, Arc::new(SystemAllocator)).unwrap()
    }

    fn recording(log: &Arc<Mutex<Vec<u32>>>, id: u32) -> Task {
        let log = Arc::clone(log);
        Task::new(move || log.lock().unwrap().push(id))
    }

    fn push(store: &mut TaskStore, task: Task) {
        store.push_with(task, |task| task).unwrap();
    }

    fn run_all(store: &mut TaskStore) {
        while let Some(task) = store.pop() {
            task.run();
        }
    }

    #[test]
    fn lifo_pops_newest_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut store = store(TaskOrder::Lifo);
        for id in 1..=3 {
            push(&mut store, recording(&log, id));
        }
        run_all(&mut store);
        assert_eq!(*log.lock().unwrap(), vec![3, 2, 1]);
    }

    #[test]
    fn fifo_pops_oldest_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut store = store(TaskOrder::Fifo);
        for id in 1..=3 {
            push(&mut store, recording(&log, id));
        }
        run_all(&mut store);
        assert_eq!(*log.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn lifo_after_wrap_still_pops_newest() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut store = store(TaskOrder::Lifo);
        for id in 1..=4 {
            push(&mut store, recording(&log, id));
        }
        store.pop().unwrap().run();
        store.pop().unwrap().run();
        push(&mut store, recording(&log, 5));
        push(&mut store, recording(&log, 6));
        run_all(&mut store);
        assert_eq!(*log.lock().unwrap(), vec![4, 3, 6, 5, 2, 1]);
    }

    #[test]
    fn full_store_hands_value_back() {
        let mut store = store(TaskOrder::Lifo);
        for _ in 0..4 {
            push(&mut store, Task::new(|| {}));
        }
        let mut built = false;
        let rejected = store
            .push_with(7u32, |_| {
                built = true;
                Task::new(|| {})
            })
            .unwrap_err();
        assert_eq!(rejected, 7);
        assert!(!built);
        assert_eq!(store.len(), 4);
        assert_eq!(store.clear(), 4);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 4);
    }
}
