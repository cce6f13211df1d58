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

//! The bounded queue between the platform input callbacks and the frame loop.

use super::types::Event;
use crate::collections::RingBuffer;
use crate::memory::{AllocError, BufferAllocator, SystemAllocator};
use crate::sync::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// The number of events an [`EventQueue`] holds when created with [`Default`].
pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 255;

/// A bounded, first-in first-out queue of [`Event`]s.
///
/// The platform layer pushes events from its callbacks; the frame loop pulls them
/// once per tick. The queue is `Send + Sync` and is meant to be shared through an
/// `Arc`. Several producers may push concurrently.
///
/// # Overflow
///
/// When the queue is full, a newly pushed event is dropped and the queued events
/// are kept untouched: the oldest input wins. This is not an error; [`push`]
/// returns `false` and the drop is counted in [`dropped_count`].
///
/// # Consumption
///
/// The frame loop is expected to [`drain`] the whole queue at the start of every
/// tick, which keeps input latency at one frame even under bursts. Pulling a
/// single event per tick with [`pull`] also works but lets a backlog build up.
///
/// [`push`]: Self::push
/// [`pull`]: Self::pull
/// [`drain`]: Self::drain
/// [`dropped_count`]: Self::dropped_count
pub struct EventQueue {
    ring: Mutex<RingBuffer<Event>>,
    capacity: usize,
    dropped: AtomicU64,
}

impl EventQueue {
    /// Creates an empty queue holding up to `capacity` events, backed by the
    /// system allocator.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::ZeroCapacity`] if `capacity` is zero, or another
    /// [`AllocError`] if the storage cannot be reserved.
    pub fn new(capacity: usize) -> Result<Self, AllocError> {
        Self::with_allocator(capacity, Arc::new(SystemAllocator))
    }

    /// Creates an empty queue whose storage is reserved through `allocator`.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if `capacity` is zero or `allocator` refuses the storage.
    pub fn with_allocator(
        capacity: usize,
        allocator: Arc<dyn BufferAllocator>,
    ) -> Result<Self, AllocError> {
        let ring = RingBuffer::with_capacity(capacity, allocator)?;
        log::debug!("EventQueue created with capacity {capacity}.");
        Ok(Self {
            ring: Mutex::new(ring),
            capacity,
            dropped: AtomicU64::new(0),
        })
    }

    /// Appends `event` to the queue.
    ///
    /// Returns `false` if the queue was full; the event is then dropped and
    /// nothing else changes.
    pub fn push(&self, event: Event) -> bool {
        match self.ring.lock().push_back(event) {
            Ok(()) => true,
            Err(rejected) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                log::trace!(
                    "EventQueue full ({} events), dropped {:?} ({dropped} dropped so far).",
                    self.capacity,
                    rejected.kind()
                );
                false
            }
        }
    }

    /// Removes and returns the oldest queued event, or `None` if the queue is empty.
    pub fn pull(&self) -> Option<Event> {
        self.ring.lock().pop_front()
    }

    /// Returns an iterator over the events queued when the drain starts.
    ///
    /// The lock is taken once per event, so producers are never blocked for the
    /// duration of a whole drain. Events pushed while draining stay queued for the
    /// next drain, which bounds a single drain to [`capacity`] events even under a
    /// continuous producer.
    ///
    /// [`capacity`]: Self::capacity
    pub fn drain(&self) -> Drain<'_> {
        Drain {
            queue: self,
            remaining: self.len(),
        }
    }

    /// The number of queued events.
    pub fn len(&self) -> usize {
        self.ring.lock().len()
    }

    /// Returns `true` if no event is queued.
    pub fn is_empty(&self) -> bool {
        self.ring.lock().is_empty()
    }

    /// The maximum number of queued events.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of events dropped because the queue was full, since creation.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Discards every queued event. The dropped counter is left untouched.
    pub fn clear(&self) {
        self.ring.lock().clear();
    }
}

impl Default for EventQueue {
    /// Creates a queue of [`DEFAULT_EVENT_QUEUE_CAPACITY`] events.
    ///
    /// # Panics
    ///
    /// Panics if the system allocator cannot provide the storage, like
    /// `Vec::with_capacity` does.
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_QUEUE_CAPACITY)
            .unwrap_or_else(|err| panic!("failed to create the default EventQueue: {err}"))
    }
}

impl fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("dropped", &self.dropped_count())
            .finish()
    }
}

/// Iterator returned by [`EventQueue::drain`].
#[derive(Debug)]
pub struct Drain<'a> {
    queue: &'a EventQueue,
    remaining: usize,
}

impl Iterator for Drain<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let event = self.queue.pull();
        // A concurrent clear can empty the queue under us.
        if event.is_none() {
            self.remaining = 0;
        }
        event
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{KeyCode, MouseButton};
    use crate::memory::TrackingAllocator;

    fn key(c: char) -> Event {
        Event::KeyDown {
            key: KeyCode::from_char(c).unwrap(),
        }
    }

    #[test]
    fn pull_returns_events_in_push_order() {
        let queue = EventQueue::new(8).unwrap();
        let events = [
            key('w'),
            Event::MouseMove { x: 10, y: 20 },
            Event::ButtonDown {
                button: MouseButton::Left,
            },
            Event::Quit,
        ];
        for event in events {
            assert!(queue.push(event));
        }
        assert_eq!(queue.len(), 4);

        for expected in events {
            assert_eq!(queue.pull(), Some(expected));
        }
        assert_eq!(queue.pull(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn overflow_drops_newest_event() {
        let queue = EventQueue::new(3).unwrap();
        assert!(queue.push(key('a')));
        assert!(queue.push(key('b')));
        assert!(queue.push(key('c')));
        assert!(!queue.push(key('d')));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.dropped_count(), 1);
        assert_eq!(queue.pull(), Some(key('a')));
        assert_eq!(queue.pull(), Some(key('b')));
        assert_eq!(queue.pull(), Some(key('c')));
        assert_eq!(queue.pull(), None);
    }

    #[test]
    fn rejected_push_leaves_ring_untouched() {
        let queue = EventQueue::new(2).unwrap();
        queue.push(Event::SetFocus);
        queue.push(Event::LostFocus);
        let (front, rear) = {
            let ring = queue.ring.lock();
            (ring.front(), ring.rear())
        };

        assert!(!queue.push(Event::Quit));

        let ring = queue.ring.lock();
        assert_eq!(ring.front(), front);
        assert_eq!(ring.rear(), rear);
        assert_eq!(ring.len(), 2);
        let contents: Vec<_> = ring.iter().copied().collect();
        assert_eq!(contents, vec![Event::SetFocus, Event::LostFocus]);
    }

    #[test]
    fn drain_empties_the_queue() {
        let queue = EventQueue::new(16).unwrap();
        for x in 0..10 {
            queue.push(Event::MouseMove { x, y: 0 });
        }
        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(drained.len(), 10);
        assert_eq!(drained[9], Event::MouseMove { x: 9, y: 0 });
        assert!(queue.is_empty());
        assert_eq!(queue.drain().count(), 0);
    }

    #[test]
    fn drain_leaves_events_pushed_mid_drain_for_next_time() {
        let queue = EventQueue::new(8).unwrap();
        queue.push(key('a'));
        queue.push(key('b'));

        let mut drain = queue.drain();
        assert_eq!(drain.next(), Some(key('a')));
        assert!(queue.push(key('c')));
        let rest: Vec<_> = drain.collect();

        assert_eq!(rest, vec![key('b')]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain().collect::<Vec<_>>(), vec![key('c')]);
    }

    #[test]
    fn wraps_after_interleaved_push_and_pull() {
        let queue = EventQueue::new(3).unwrap();
        for round in 0..10 {
            assert!(queue.push(Event::Resized {
                width: round,
                height: round
            }));
            assert_eq!(
                queue.pull(),
                Some(Event::Resized {
                    width: round,
                    height: round
                })
            );
        }
        assert_eq!(queue.dropped_count(), 0);
    }

    #[test]
    fn default_capacity_is_255() {
        let queue = EventQueue::default();
        assert_eq!(queue.capacity(), DEFAULT_EVENT_QUEUE_CAPACITY);
        for _ in 0..DEFAULT_EVENT_QUEUE_CAPACITY {
            assert!(queue.push(Event::Maximized));
        }
        assert!(!queue.push(Event::Minimized));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(EventQueue::new(0).unwrap_err(), AllocError::ZeroCapacity);
    }

    #[test]
    fn clear_keeps_dropped_count() {
        let queue = EventQueue::new(1).unwrap();
        queue.push(Event::Quit);
        queue.push(Event::Quit);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.dropped_count(), 1);
        assert!(queue.push(Event::SetFocus));
    }

    #[test]
    fn storage_is_accounted_by_the_allocator() {
        let allocator = Arc::new(TrackingAllocator::new());
        let queue = EventQueue::with_allocator(32, allocator.clone()).unwrap();
        assert_eq!(allocator.stats().live_buffers(), 1);
        assert!(allocator.stats().current_bytes > 0);
        drop(queue);
        assert_eq!(allocator.stats().live_buffers(), 0);
        assert_eq!(allocator.stats().current_bytes, 0);
    }
}
