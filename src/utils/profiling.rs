use std::time::Duration;

/// Per-step timing and count data gathered by the world. Reported at debug
/// level; cheap enough to keep always on.
#[derive(Debug, Default, Clone, Copy)]
pub struct StepProfiler {
    pub broad_phase_time: Duration,
    pub narrow_phase_time: Duration,
    pub solver_time: Duration,
    pub total_step_time: Duration,

    pub body_count: usize,
    pub contact_count: usize,
    pub touching_count: usize,
}

impl StepProfiler {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Emits a one-line phase breakdown when debug logging is on.
    pub fn report_if_enabled(&self) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        let total_us = self.total_step_time.as_micros().max(1) as f32;
        log::debug!(
            "step {:.2} ms | bodies {} contacts {} touching {} | broad {:.0}% narrow {:.0}% solve {:.0}%",
            self.total_step_time.as_secs_f32() * 1000.0,
            self.body_count,
            self.contact_count,
            self.touching_count,
            self.broad_phase_time.as_micros() as f32 / total_us * 100.0,
            self.narrow_phase_time.as_micros() as f32 / total_us * 100.0,
            self.solver_time.as_micros() as f32 / total_us * 100.0,
        );
    }
}
