//! Progress reporting and cooperative cancellation.
//!
//! Multi-league scans report completion through a [`ProgressSink`] so the
//! core never depends on a UI framework's state primitives, and honor a
//! caller-held [`CancelToken`] checked at batch boundaries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives completion counts during a scan. `report` is called synchronously
/// once per completed unit (success or failure); `completed` never decreases
/// and reaches `total` only after every unit has been accounted for.
pub trait ProgressSink {
    fn report(&mut self, completed: usize, total: usize);
}

impl<F: FnMut(usize, usize)> ProgressSink for F {
    fn report(&mut self, completed: usize, total: usize) {
        self(completed, total)
    }
}

/// A sink that discards progress.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&mut self, _completed: usize, _total: usize) {}
}

/// Adapter for scans with several sequential phases: maps a phase's local
/// counts onto one overall range so the outer counter stays monotone.
pub struct PhaseProgress<'a> {
    inner: &'a mut dyn ProgressSink,
    offset: usize,
    overall_total: usize,
}

impl<'a> PhaseProgress<'a> {
    pub fn new(inner: &'a mut dyn ProgressSink, offset: usize, overall_total: usize) -> Self {
        Self {
            inner,
            offset,
            overall_total,
        }
    }
}

impl ProgressSink for PhaseProgress<'_> {
    fn report(&mut self, completed: usize, _total: usize) {
        self.inner.report(self.offset + completed, self.overall_total);
    }
}

/// Caller-held liveness flag. Once cancelled, scans stop applying results to
/// caller-visible state; in-flight fetches still complete so the cache is
/// populated for later reuse.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
