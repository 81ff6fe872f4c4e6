use std::time::Duration;

use tokio::runtime::Handle;

use crate::{Error, Result};

/// A fire-and-forget unit of work
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs deferred tasks on an unspecified thread
///
/// Implementations must run every submitted task exactly once and must be
/// callable from any thread.
pub trait TaskScheduler: Send + Sync {
    /// Run `task` as soon as possible
    fn run_now(&self, task: Task);

    /// Run `task` once `delay` has elapsed
    fn run_after(&self, task: Task, delay: Duration);
}

/// Scheduler backed by a tokio runtime
///
/// Holds a runtime [`Handle`] so tasks can be submitted from threads that are
/// not part of the runtime (for example a device input thread).
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Create a scheduler bound to the runtime of the calling context
    pub fn try_current() -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|e| Error::Other(format!("No tokio runtime available: {}", e)))?;
        Ok(Self::new(handle))
    }
}

impl TaskScheduler for TokioScheduler {
    fn run_now(&self, task: Task) {
        self.handle.spawn(async move {
            task();
        });
    }

    fn run_after(&self, task: Task, delay: Duration) {
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}
