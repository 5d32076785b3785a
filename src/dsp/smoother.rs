//! One-pole value smoother.

use std::f64::consts::TAU;

/// Gap below which the smoother snaps to its target.
const SNAP_EPSILON: f64 = 1e-9;

/// Smoothing factor for a one-pole smoother with the given time in ms.
///
/// Uses `1 - exp(-2π / (time_s * sample_rate))`, the same curve as the
/// parameter smoothers. A non-positive time disables smoothing (factor 1).
#[inline]
pub fn smoothing_factor(time_ms: f64, sample_rate: f64) -> f64 {
    if time_ms > 0.0 && sample_rate > 0.0 {
        1.0 - (-TAU / (time_ms * 0.001 * sample_rate)).exp()
    } else {
        1.0
    }
}

/// Minimal one-pole exponential smoother for a single control signal.
///
/// Used on the note-mode frequency after it has been converted to Hz.
#[derive(Debug, Clone, Copy)]
pub struct ValueSmoother {
    last_value: f64,
    smooth_factor: f64,
}

impl ValueSmoother {
    pub fn new() -> Self {
        Self {
            last_value: 0.0,
            smooth_factor: 0.005,
        }
    }

    pub fn set_smooth_time(&mut self, time_ms: f64, sample_rate: f64) {
        self.smooth_factor = smoothing_factor(time_ms, sample_rate);
    }

    /// Advance one sample toward `target` and return the smoothed value.
    #[inline]
    pub fn next_value(&mut self, target: f64) -> f64 {
        let difference = target - self.last_value;

        if difference.abs() < SNAP_EPSILON {
            self.last_value = target;
        } else {
            self.last_value += difference * self.smooth_factor;
        }

        self.last_value
    }

    pub fn value(&self) -> f64 {
        self.last_value
    }

    pub fn reset(&mut self) {
        self.last_value = 0.0;
    }
}

impl Default for ValueSmoother {
    fn default() -> Self {
        Self::new()
    }
}
