//! Deferred task execution
//!
//! Features never own a thread of their own. Timed work (such as the scroll
//! smoother's drain loop) is handed to a [`TaskScheduler`], which runs each
//! task exactly once, either immediately or after a delay.

mod executor;
#[cfg(test)]
pub(crate) mod manual;

pub use executor::{Task, TaskScheduler, TokioScheduler};
