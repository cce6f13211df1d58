use criterion::{criterion_group, criterion_main, Criterion};
use kiln_core::event::{Event, EventQueue, KeyCode};
use std::hint::black_box;

fn bench_event_queue(c: &mut Criterion) {
    let queue = EventQueue::default();
    let capacity = queue.capacity();

    let mut group = c.benchmark_group("Event Queue");

    group.bench_function("Push + Pull (single event)", |b| {
        b.iter(|| {
            queue.push(black_box(Event::KeyDown { key: KeyCode::SPACE }));
            black_box(queue.pull());
        });
    });

    // A frame's worth of input: fill the queue, then drain it in one go.
    group.bench_function("Fill + Drain (full frame burst)", |b| {
        b.iter(|| {
            for x in 0..capacity as i32 {
                queue.push(Event::MouseMove { x, y: x });
            }
            let mut drained = 0;
            for event in queue.drain() {
                drained += 1;
                black_box(event);
            }
            black_box(drained);
        });
    });

    // Overflow path: every push is rejected.
    for _ in 0..capacity {
        queue.push(Event::Quit);
    }
    group.bench_function("Push (queue full)", |b| {
        b.iter(|| black_box(queue.push(black_box(Event::Quit))));
    });

    group.finish();
}

criterion_group!(benches, bench_event_queue);
criterion_main!(benches);
