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

// Kiln Sandbox
// A simulated input thread feeds the event queue; a fixed-tick frame loop
// drains it and offloads asset loads to the worker pool.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use kiln_core::event::{Event, EventQueue, KeyCode, MouseButton};
use kiln_core::memory::{BufferAllocator, TrackingAllocator};
use kiln_core::sync::{StopToken, Thread};
use kiln_pool::{PoolConfig, Task, WorkerPool};

/// Settings for a sandbox run.
#[derive(Debug, Clone)]
struct SandboxConfig {
    /// Frame loop frequency in Hz.
    frame_rate: u32,
    /// The loop exits after this many frames even without a `Quit` event.
    max_frames: u32,
    /// Number of events the simulated input thread produces before `Quit`.
    producer_events: u32,
    /// Delay between two simulated events.
    producer_interval: Duration,
    /// Event queue capacity.
    queue_capacity: usize,
    pool: PoolConfig,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            max_frames: 600,
            producer_events: 2_000,
            producer_interval: Duration::from_micros(500),
            queue_capacity: 255,
            pool: PoolConfig::default().with_thread_name_prefix("sandbox-asset"),
        }
    }
}

/// The scripted input the simulated platform thread replays, one per step.
fn scripted_event(step: u32) -> Event {
    match step % 10 {
        0 => Event::KeyDown {
            key: KeyCode::from_char('l').unwrap_or(KeyCode::SPACE),
        },
        1 => Event::KeyUp {
            key: KeyCode::from_char('l').unwrap_or(KeyCode::SPACE),
        },
        2 => Event::ButtonDown {
            button: MouseButton::Left,
        },
        3 => Event::ButtonUp {
            button: MouseButton::Left,
        },
        4 => Event::MouseWheel { x: 0, y: 120 },
        5 => Event::Char { character: 'k' },
        _ => Event::MouseMove {
            x: (step % 1280) as i32,
            y: (step % 720) as i32,
        },
    }
}

/// Runs on the input thread until the script ends or the token is raised.
fn produce_input(queue: Arc<EventQueue>, config: SandboxConfig, stop: StopToken) {
    log::info!("Input thread started.");
    for step in 0..config.producer_events {
        if stop.is_stopped() {
            log::info!("Input thread stopped at step {step}.");
            return;
        }
        queue.push(scripted_event(step));
        thread::sleep(config.producer_interval);
    }
    while !queue.push(Event::Quit) && !stop.is_stopped() {
        thread::sleep(config.producer_interval);
    }
    log::info!("Input thread finished its script.");
}

/// Pretend to decode an asset: burn a little time and produce a checksum.
fn load_asset(id: u64, loaded: &AtomicU64) {
    let checksum = (0..10_000u64).fold(id, |acc, n| acc.wrapping_mul(31).wrapping_add(n));
    thread::sleep(Duration::from_millis(2));
    loaded.fetch_add(1, Ordering::Relaxed);
    log::trace!("Asset {id} loaded (checksum {checksum:#x}).");
}

#[derive(Debug, Default)]
struct FrameStats {
    frames: u32,
    events: u64,
    largest_batch: usize,
    loads_requested: u64,
    loads_rejected: u64,
}

fn run(config: SandboxConfig) -> Result<()> {
    let allocator = Arc::new(TrackingAllocator::new());
    let queue = Arc::new(
        EventQueue::with_allocator(config.queue_capacity, allocator.clone())
            .context("failed to create the event queue")?,
    );
    let pool = WorkerPool::with_allocator(config.pool.clone(), allocator.clone())
        .context("failed to create the worker pool")?;
    let failures = pool.failures();
    log::info!(
        "Engine buffers reserved: {} bytes.",
        allocator.stats().current_bytes
    );

    let input = {
        let queue = Arc::clone(&queue);
        let config = config.clone();
        Thread::spawn("sandbox-input", move |stop| produce_input(queue, config, stop))
            .context("failed to start the input thread")?
    };

    let loaded = Arc::new(AtomicU64::new(0));
    let tick = Duration::from_secs_f64(1.0 / f64::from(config.frame_rate.max(1)));
    let mut stats = FrameStats::default();
    let mut quit = false;

    while !quit && stats.frames < config.max_frames {
        let frame_start = Instant::now();
        let mut batch = 0;

        for event in queue.drain() {
            batch += 1;
            match event {
                Event::Quit => quit = true,
                Event::KeyDown { key } if Some(key) == KeyCode::from_char('l') => {
                    let id = stats.loads_requested + stats.loads_rejected;
                    let loaded = Arc::clone(&loaded);
                    let task = Task::labeled("load-asset", move || load_asset(id, &loaded));
                    match pool.push(task) {
                        Ok(()) => stats.loads_requested += 1,
                        Err(err) => {
                            stats.loads_rejected += 1;
                            log::debug!("Asset load {id} skipped: {err}");
                        }
                    }
                }
                _ => {}
            }
        }

        for failure in failures.try_iter() {
            log::warn!("Asset task failed: {failure:?}");
        }

        stats.events += batch as u64;
        stats.largest_batch = stats.largest_batch.max(batch);
        stats.frames += 1;

        if let Some(remaining) = tick.checked_sub(frame_start.elapsed()) {
            thread::sleep(remaining);
        }
    }

    if quit {
        input.join().context("input thread failed")?;
    } else {
        log::warn!("Frame budget exhausted before Quit; stopping the input thread.");
        input.stop_token().stop();
        input.join().context("input thread failed")?;
    }

    pool.stop();
    let report = pool.destroy().context("worker pool shutdown failed")?;

    log::info!(
        "Ran {} frames, {} events (largest batch {}, {} dropped).",
        stats.frames,
        stats.events,
        stats.largest_batch,
        queue.dropped_count()
    );
    log::info!(
        "Asset loads: {} requested, {} rejected, {} finished, {} abandoned.",
        stats.loads_requested,
        stats.loads_rejected,
        loaded.load(Ordering::Relaxed),
        report.abandoned
    );
    Ok(())
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();
    run(SandboxConfig::default())
}
