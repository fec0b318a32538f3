//! Progress reporting and cooperative cancellation.
//!
//! The engine calls [`ProgressSink::report`] with a percentage in `0..=100`
//! that never decreases within one run, and polls a [`CancelToken`] at fixed
//! points (before the run starts and once per scanned sheet).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives `(percent, message)` notifications from a running comparison
pub trait ProgressSink {
    fn report(&self, percent: u8, message: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(u8, &str),
{
    fn report(&self, percent: u8, message: &str) {
        self(percent, message)
    }
}

/// A sink that drops every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _percent: u8, _message: &str) {}
}

/// A shared flag a caller sets to request cancellation.
///
/// Clones observe the same flag, so one clone can be handed to the
/// background worker while another stays with the caller.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
