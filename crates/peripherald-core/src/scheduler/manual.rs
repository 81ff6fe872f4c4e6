//! Deterministic scheduler for tests: tasks are queued and only run when the
//! test asks for it.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{Task, TaskScheduler};

#[derive(Default)]
pub(crate) struct ManualScheduler {
    queue: Mutex<VecDeque<(Task, Duration)>>,
    immediate: AtomicUsize,
    delayed: AtomicUsize,
}

impl ManualScheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of queued tasks that have not run yet
    pub(crate) fn queued(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    /// Total `run_now` submissions so far
    pub(crate) fn immediate_count(&self) -> usize {
        self.immediate.load(Ordering::SeqCst)
    }

    /// Total `run_after` submissions so far
    pub(crate) fn delayed_count(&self) -> usize {
        self.delayed.load(Ordering::SeqCst)
    }

    /// Run the oldest queued task, returning the delay it was scheduled with
    pub(crate) fn run_next(&self) -> Option<Duration> {
        // The lock must be released before the task runs: it may schedule again.
        let next = self.queue.lock().unwrap().pop_front();
        next.map(|(task, delay)| {
            task();
            delay
        })
    }

    /// Run tasks until the queue is empty, returning the delays observed
    pub(crate) fn run_until_idle(&self, limit: usize) -> Vec<Duration> {
        let mut delays = Vec::new();
        while let Some(delay) = self.run_next() {
            delays.push(delay);
            assert!(delays.len() <= limit, "scheduler did not go idle");
        }
        delays
    }
}

impl TaskScheduler for ManualScheduler {
    fn run_now(&self, task: Task) {
        self.immediate.fetch_add(1, Ordering::SeqCst);
        self.queue.lock().unwrap().push_back((task, Duration::ZERO));
    }

    fn run_after(&self, task: Task, delay: Duration) {
        self.delayed.fetch_add(1, Ordering::SeqCst);
        self.queue.lock().unwrap().push_back((task, delay));
    }
}
