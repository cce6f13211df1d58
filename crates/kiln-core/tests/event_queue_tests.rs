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

use kiln_core::event::{Event, EventQueue, KeyCode};
use kiln_core::sync::Thread;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[test]
fn producer_thread_feeds_frame_loop() {
    // --- 1. ARRANGE ---
    let queue = Arc::new(EventQueue::new(64).unwrap());
    let total = 500;

    // --- 2. ACT ---
    // A simulated platform thread pushes events while the "frame loop" drains.
    let producer = {
        let queue = Arc::clone(&queue);
        Thread::start(
            "kiln-test-input",
            move |count: i32| {
                for x in 0..count {
                    while !queue.push(Event::MouseMove { x, y: 0 }) {
                        std::thread::yield_now();
                    }
                }
            },
            total,
        )
        .unwrap()
    };

    let mut received = Vec::with_capacity(total as usize);
    let deadline = Instant::now() + Duration::from_secs(5);
    while received.len() < total as usize && Instant::now() < deadline {
        received.extend(queue.drain());
        std::thread::sleep(Duration::from_micros(100));
    }
    producer.join().unwrap();

    // --- 3. ASSERT ---
    // A single producer with retry loses nothing and keeps its order.
    assert_eq!(received.len(), total as usize);
    for (expected, event) in received.iter().enumerate() {
        assert_eq!(
            *event,
            Event::MouseMove {
                x: expected as i32,
                y: 0
            }
        );
    }
}

#[test]
fn concurrent_producers_never_exceed_capacity() {
    let queue = Arc::new(EventQueue::new(100).unwrap());
    let producers: Vec<_> = (0..4u8)
        .map(|id| {
            let queue = Arc::clone(&queue);
            Thread::spawn(format!("kiln-test-producer-{id}"), move |_| {
                for _ in 0..50 {
                    queue.push(Event::KeyDown {
                        key: KeyCode(b'A' + id),
                    });
                }
            })
            .unwrap()
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    // 200 pushes into 100 slots: exactly the surplus is dropped.
    assert_eq!(queue.len(), 100);
    assert_eq!(queue.dropped_count(), 100);
    assert_eq!(queue.drain().count(), 100);
}

#[test]
fn per_key_order_is_preserved_across_producers() {
    let queue = Arc::new(EventQueue::new(1_000).unwrap());
    let producers: Vec<_> = (0..3i32)
        .map(|id| {
            let queue = Arc::clone(&queue);
            Thread::spawn(format!("kiln-test-ordered-{id}"), move |_| {
                for seq in 0..200 {
                    assert!(queue.push(Event::MouseWheel { x: id, y: seq }));
                }
            })
            .unwrap()
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    let mut last_seen = [-1i32; 3];
    for event in queue.drain() {
        match event {
            Event::MouseWheel { x, y } => {
                assert!(y > last_seen[x as usize], "producer {x} reordered");
                last_seen[x as usize] = y;
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(last_seen, [199; 3]);
}

#[test]
fn one_drain_is_bounded_under_a_continuous_producer() {
    // --- 1. ARRANGE ---
    let capacity = 8;
    let queue = Arc::new(EventQueue::new(capacity).unwrap());
    let stop = Arc::new(AtomicBool::new(false));
    let producer = {
        let queue = Arc::clone(&queue);
        let stop = Arc::clone(&stop);
        Thread::start(
            "kiln-test-flood",
            move |_: ()| {
                let mut x: i32 = 0;
                while !stop.load(Ordering::Relaxed) {
                    queue.push(Event::MouseMove { x, y: 0 });
                    x = x.wrapping_add(1);
                    std::thread::yield_now();
                }
            },
            (),
        )
        .unwrap()
    };
    let deadline = Instant::now() + Duration::from_secs(5);
    while queue.len() < capacity && Instant::now() < deadline {
        std::thread::yield_now();
    }

    // --- 2. ACT ---
    // A slow consumer gives the producer time to refill every freed slot.
    let mut drained = 0;
    for _ in queue.drain() {
        drained += 1;
        std::thread::sleep(Duration::from_micros(50));
    }
    stop.store(true, Ordering::Relaxed);
    producer.join().unwrap();

    // --- 3. ASSERT ---
    assert!(drained <= capacity, "one drain yielded {drained} events");
}
