//! Wall-clock to fixed-tick conversion for host loops

use std::time::Duration;

use crate::consts::{MAX_SUBSTEPS, TICK_HZ};

/// Accumulates elapsed time and hands out whole simulation ticks
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step_secs: f64,
    accumulator: f64,
    max_substeps: u32,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(TICK_HZ)
    }
}

impl FixedTimestep {
    pub fn new(hz: f64) -> Self {
        Self {
            step_secs: 1.0 / hz.max(f64::MIN_POSITIVE),
            accumulator: 0.0,
            max_substeps: MAX_SUBSTEPS,
        }
    }

    pub fn with_max_substeps(self, max_substeps: u32) -> Self {
        Self {
            max_substeps: max_substeps.max(1),
            ..self
        }
    }

    /// Length of one tick in seconds
    #[inline]
    pub fn step_secs(&self) -> f64 {
        self.step_secs
    }

    /// Add elapsed wall time; returns how many ticks to run now
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulator += elapsed.as_secs_f64();

        let mut ticks = 0;
        while self.accumulator >= self.step_secs && ticks < self.max_substeps {
            self.accumulator -= self.step_secs;
            ticks += 1;
        }

        // Spiral of death guard: drop whatever backlog is left
        if self.accumulator >= self.step_secs {
            log::warn!(
                "Simulation fell behind, dropping {:.1} ms",
                self.accumulator * 1000.0
            );
            self.accumulator %= self.step_secs;
        }

        ticks
    }

    /// Fraction of a tick left over, for render interpolation
    #[inline]
    pub fn alpha(&self) -> f64 {
        (self.accumulator / self.step_secs).clamp(0.0, 1.0)
    }
}
