//! Series cascade of allpass stages sharing one coefficient state.

/*
Allpass Cascade
===============

    x ──→ [stage 0] ──→ [stage 1] ──→ ... ──→ [stage n-1] ──→ y
              ↑             ↑                      ↑
              └─────────────┴──── coefficients ────┘

Every stage sees the same (k, g) on a given sample; the coefficient state is
advanced once per sample before the stages run. Only the first `n` stages
are used, where `n` (the depth) can change on any sample. Stages beyond `n`
keep whatever memory they had and resume from it when the depth grows back.

A change of depth switches instantly with no crossfade. That can click on
hard jumps; the output limiter downstream is the only mitigation, and it is
part of the character of the effect.
*/

use super::allpass::{AllpassStage, CoefficientState};
use crate::MAX_NUM_STAGES;

/// Fixed-capacity allpass cascade with a variable active prefix.
#[derive(Debug, Clone)]
pub struct AllpassCascade {
    stages: [AllpassStage; MAX_NUM_STAGES],
    coefficients: CoefficientState,
}

impl AllpassCascade {
    pub fn new() -> Self {
        Self {
            stages: [AllpassStage::new(); MAX_NUM_STAGES],
            coefficients: CoefficientState::new(),
        }
    }

    pub fn set_smooth_time(&mut self, smooth_ms: f64, sample_rate: u32) {
        self.coefficients.set_smooth_time(smooth_ms, sample_rate);
    }

    /// Advance the shared coefficients one sample toward the given settings.
    #[inline]
    pub fn update_coefficients(&mut self, frequency_hz: f64, resonance: f64, sample_rate: u32) {
        self.coefficients.update(frequency_hz, resonance, sample_rate);
    }

    /// Run `x` through the first `active_stages` stages in series.
    ///
    /// `active_stages` is clamped to the cascade capacity.
    #[inline]
    pub fn process(&mut self, x: f32, active_stages: usize) -> f32 {
        let active = active_stages.min(MAX_NUM_STAGES);
        let coefficients = &self.coefficients;

        let mut sample = x;
        for stage in self.stages[..active].iter_mut() {
            sample = stage.process(sample, coefficients);
        }
        sample
    }

    /// Clear every stage's memory. Coefficients are kept.
    pub fn reset(&mut self) {
        for stage in self.stages.iter_mut() {
            stage.reset();
        }
    }

    pub fn coefficients(&self) -> &CoefficientState {
        &self.coefficients
    }

    pub fn coefficients_mut(&mut self) -> &mut CoefficientState {
        &mut self.coefficients
    }

    pub fn stages(&self) -> &[AllpassStage] {
        &self.stages
    }

    /// True when every stage's memory is exactly zero.
    pub fn is_silent(&self) -> bool {
        self.stages.iter().all(|stage| stage.state() == (0.0, 0.0))
    }
}

impl Default for AllpassCascade {
    fn default() -> Self {
        Self::new()
    }
}
