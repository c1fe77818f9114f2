use log::{log_enabled, Level};
use std::time::{Duration, Instant};

/// Trace-level scoped timer for the hot pipeline phases. Costs nothing when
/// trace logging is disabled.
pub struct ScopedTimer<'a> {
    label: &'a str,
    start: Instant,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(label: &'a str) -> Self {
        if log_enabled!(Level::Trace) {
            log::trace!("begin {label}");
        }
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl<'a> Drop for ScopedTimer<'a> {
    fn drop(&mut self) {
        if log_enabled!(Level::Trace) {
            log::trace!("end {} ({} us)", self.label, self.start.elapsed().as_micros());
        }
    }
}

/// Warns when a step ran longer than the caller's real-time budget.
pub fn warn_if_step_budget_exceeded(duration: Duration, budget_ms: f32) {
    let elapsed_ms = duration.as_secs_f32() * 1000.0;
    if elapsed_ms > budget_ms {
        log::warn!("step exceeded budget: {elapsed_ms:.2} ms > {budget_ms:.2} ms");
    }
}
