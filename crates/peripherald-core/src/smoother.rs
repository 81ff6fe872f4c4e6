//! Scroll-delta smoothing
//!
//! Raw wheel movement arrives as large, bursty signed deltas. The smoother
//! accumulates them into a single signed buffer and releases that buffer as a
//! paced sequence of small chunks: each drain tick emits
//! `max(1, |buffer| / steps)` in the direction of the buffer, then reschedules
//! itself `interval_ms` later until the buffer is empty.
//!
//! Big flicks therefore start with large chunks and taper off toward single
//! units, and the one-unit floor bounds every episode to at most `|buffer|`
//! ticks.
//!
//! All numeric state is atomic. At most one drain tick is scheduled or running
//! per instance (the `draining` flag), and scheduled ticks only hold a
//! [`Weak`] handle, so dropping the smoother while a tick is queued turns that
//! tick into a no-op.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tracing::{debug, trace};

use crate::scheduler::{Task, TaskScheduler};

/// Default delay between drain ticks
pub const DEFAULT_INTERVAL_MS: u32 = 8;
/// Default release divisor
pub const DEFAULT_STEPS: u32 = 10;

/// Sink receiving every emitted chunk
pub type ChunkCallback = Arc<dyn Fn(i32) + Send + Sync>;

/// Paced scroll release engine
///
/// Always lives inside an [`Arc`]; use [`ScrollSmoother::new`].
pub struct ScrollSmoother {
    /// Net undrained amount; the sign is the pending direction
    buffer: AtomicI32,
    /// Set while a drain tick is scheduled or executing
    draining: AtomicBool,
    interval_ms: AtomicU32,
    steps: AtomicU32,
    on_chunk: Mutex<Option<ChunkCallback>>,
    scheduler: Arc<dyn TaskScheduler>,
    this: Weak<ScrollSmoother>,
}

impl ScrollSmoother {
    /// Create an idle smoother with default pacing
    pub fn new(scheduler: Arc<dyn TaskScheduler>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            buffer: AtomicI32::new(0),
            draining: AtomicBool::new(false),
            interval_ms: AtomicU32::new(DEFAULT_INTERVAL_MS),
            steps: AtomicU32::new(DEFAULT_STEPS),
            on_chunk: Mutex::new(None),
            scheduler,
            this: this.clone(),
        })
    }

    /// Add a raw delta to the buffer
    ///
    /// Starts a drain episode if none is active; otherwise the running episode
    /// picks the amount up on its next tick. Safe to call from any thread.
    pub fn feed(&self, delta: i32) {
        self.buffer.fetch_add(delta, Ordering::AcqRel);
        if !self.draining.swap(true, Ordering::AcqRel) {
            debug!(delta, "Scroll smoothing episode started");
            self.schedule_tick(None);
        }
    }

    /// Drop everything not yet emitted
    ///
    /// A tick that is already scheduled still runs; it finds the empty buffer
    /// and ends the episode without emitting.
    pub fn reset(&self) {
        self.buffer.store(0, Ordering::Release);
    }

    /// Replace the chunk sink
    ///
    /// A tick already in flight may still deliver to the previous sink.
    pub fn set_on_chunk<F>(&self, callback: F)
    where
        F: Fn(i32) + Send + Sync + 'static,
    {
        *self.sink() = Some(Arc::new(callback));
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms.load(Ordering::Relaxed)
    }

    /// Set the tick interval; values below 1 are clamped to 1
    pub fn set_interval_ms(&self, ms: i32) {
        self.interval_ms.store(clamp_positive(ms), Ordering::Relaxed);
    }

    pub fn steps(&self) -> u32 {
        self.steps.load(Ordering::Relaxed)
    }

    /// Set the release divisor; values below 1 are clamped to 1
    pub fn set_steps(&self, steps: i32) {
        self.steps.store(clamp_positive(steps), Ordering::Relaxed);
    }

    /// Amount fed but not yet emitted
    pub fn pending(&self) -> i32 {
        self.buffer.load(Ordering::Acquire)
    }

    /// Whether a drain episode is active
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    fn sink(&self) -> MutexGuard<'_, Option<ChunkCallback>> {
        self.on_chunk.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn schedule_tick(&self, delay: Option<Duration>) {
        let weak = self.this.clone();
        let task: Task = Box::new(move || {
            if let Some(this) = weak.upgrade() {
                this.drain();
            }
        });

        match delay {
            None => self.scheduler.run_now(task),
            Some(delay) => self.scheduler.run_after(task, delay),
        }
    }

    /// Take one chunk out of the buffer, or 0 if it is empty
    fn drain_once(&self) -> i32 {
        let buffer = self.buffer.load(Ordering::Acquire);
        if buffer == 0 {
            return 0;
        }

        let chunk = chunk_for(buffer, self.steps());
        self.buffer.fetch_sub(chunk, Ordering::AcqRel);
        chunk
    }

    /// One drain tick. Only ever runs while `draining` is held.
    fn drain(&self) {
        let chunk = self.drain_once();
        if chunk != 0 {
            trace!(chunk, "Emitting scroll chunk");
            // Clone out of the slot so the sink runs unlocked.
            let sink = self.sink().clone();
            if let Some(sink) = sink {
                sink(chunk);
            }
        }

        if self.buffer.load(Ordering::Acquire) != 0 {
            let delay = Duration::from_millis(u64::from(self.interval_ms()));
            self.schedule_tick(Some(delay));
        } else {
            self.finish_episode();
        }
    }

    fn finish_episode(&self) {
        self.draining.store(false, Ordering::Release);

        // A feed landing between the empty read and the store above saw the
        // flag still set and scheduled nothing.
        if self.buffer.load(Ordering::Acquire) != 0
            && self
                .draining
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        {
            self.schedule_tick(None);
            return;
        }

        debug!("Scroll smoothing episode finished");
    }
}

impl std::fmt::Debug for ScrollSmoother {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollSmoother")
            .field("buffer", &self.pending())
            .field("draining", &self.is_draining())
            .field("interval_ms", &self.interval_ms())
            .field("steps", &self.steps())
            .finish_non_exhaustive()
    }
}

#[inline]
fn clamp_positive(value: i32) -> u32 {
    value.max(1).unsigned_abs()
}

/// Signed chunk released from `buffer` in one tick: `max(1, |buffer| / steps)`
/// with the sign of `buffer`. `buffer` must be non-zero.
#[inline]
fn chunk_for(buffer: i32, steps: u32) -> i32 {
    let magnitude = (buffer.unsigned_abs() / steps.max(1)).max(1);
    // magnitude <= 2^31; only i32::MIN with steps == 1 reaches the bound,
    // and that wraps back onto itself.
    let chunk = magnitude as i32;
    if buffer > 0 {
        chunk
    } else {
        chunk.wrapping_neg()
    }
}
