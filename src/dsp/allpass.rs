//! Second-order allpass built from TPT state-variable filter taps.

use std::f64::consts::PI;

/*
Allpass From A State-Variable Filter
====================================

An allpass filter passes every frequency at unity gain but shifts phase by
an amount that depends on frequency. Chain enough of them, sweep their
centre frequency, and the phase relationships between partials keep moving:
that is the circulate / phaser sound.

Vocabulary
----------

  g           Prewarped integrator gain, tan(pi * f / fs). Sets the centre
              frequency. The tan() warp makes the digital filter hit the
              requested frequency exactly despite the bilinear transform.

  k           Damping, 1 / (2Q). Low k = narrow, resonant phase transition.
              High k = broad, gentle transition.

  s1, s2      The two integrator memories (trapezoidal integrators, so each
              state is "twice the last output minus the last state").

  bandpass    The SVF's bandpass tap. The allpass response is built from it:
                  allpass = input - 4k * bandpass
              (in analog terms: (s^2 - 2ks + 1) / (s^2 + 2ks + 1))


Per-Sample Recurrence
---------------------

    d      = 1 / (1 + 2kg + g^2)
    bp     = (g * (x - s2) + s1) * d
    s1'    = 2bp - s1
    s2'    = s2 + g * 2bp
    y      = x - 4k * bp

Both new states are computed from the OLD states; overwriting s1 before
computing s2' gives a different (wrong) filter.


Shared Coefficients
-------------------

A circulate cascade runs up to 64 identical stages. Computing tan() and
the smoothing for each of them would be wasted work, so the coefficients
live in one CoefficientState that is updated once per sample and lent to
every stage as it runs:

    CoefficientState ──&──→ stage 0 ──→ stage 1 ──→ ... ──→ stage n-1

Stages hold only their own integrator memory.


Coefficient Smoothing
---------------------

Targets are recomputed every sample from frequency and resonance, and the
live (k, g) chase them with a one-pole filter:

    value += (target - value) * smooth_factor
    smooth_factor = 1 - exp(-1 / (time_s * fs))        (time = 5 ms)

The asymptote is never reached in exact arithmetic, so once the gap is
below 1e-10 the value snaps onto the target.


Denormals
---------

With silent input the states decay toward zero forever and eventually hit
subnormal floats, which are very slow on most CPUs. Anything below 1e-20
is flushed to exactly 0.
*/

/// Time for the coefficients to close ~63% of the gap to a new target.
pub const COEFFICIENT_SMOOTH_MS: f64 = 5.0;

const SNAP_EPSILON: f64 = 1e-10;
const DENORMAL_FLOOR: f64 = 1e-20;

/// Lowest Q reachable through the normalized resonance control.
pub const MIN_Q: f64 = 0.5;
/// Highest Q reachable through the normalized resonance control.
pub const MAX_Q: f64 = 10.0;

/// Filter coefficients shared by every stage of one cascade.
#[derive(Debug, Clone, Copy)]
pub struct CoefficientState {
    k: f64,
    g: f64,
    k_target: f64,
    g_target: f64,
    smooth_factor: f64,
}

impl CoefficientState {
    pub fn new() -> Self {
        Self {
            k: 0.0,
            g: 0.0,
            k_target: 0.0,
            g_target: 0.0,
            smooth_factor: 0.001,
        }
    }

    /// Derive the smoothing factor from a time constant in ms.
    pub fn set_smooth_time(&mut self, smooth_ms: f64, sample_rate: u32) {
        let smooth_s = smooth_ms / 1000.0;
        self.smooth_factor = 1.0 - (-1.0 / (smooth_s * sample_rate as f64)).exp();
    }

    /// Compute targets for `frequency_hz` and normalized `resonance` and
    /// advance the smoothed coefficients by one sample.
    ///
    /// `resonance` in `[0, 1]` maps linearly onto Q `0.5..=10`.
    #[inline]
    pub fn update(&mut self, frequency_hz: f64, resonance: f64, sample_rate: u32) {
        let (k_target, g_target) = Self::targets(frequency_hz, resonance, sample_rate);
        self.k_target = k_target;
        self.g_target = g_target;

        let diff_k = self.k_target - self.k;
        let diff_g = self.g_target - self.g;

        self.k += diff_k * self.smooth_factor;
        self.g += diff_g * self.smooth_factor;

        if diff_k.abs() < SNAP_EPSILON {
            self.k = self.k_target;
        }
        if diff_g.abs() < SNAP_EPSILON {
            self.g = self.g_target;
        }
    }

    /// Jump straight to the coefficients for the given settings.
    pub fn snap_to(&mut self, frequency_hz: f64, resonance: f64, sample_rate: u32) {
        let (k_target, g_target) = Self::targets(frequency_hz, resonance, sample_rate);
        self.k_target = k_target;
        self.g_target = g_target;
        self.k = k_target;
        self.g = g_target;
    }

    /// `(k_target, g_target)` for a frequency and normalized resonance.
    #[inline]
    pub fn targets(frequency_hz: f64, resonance: f64, sample_rate: u32) -> (f64, f64) {
        let q_actual = MIN_Q + resonance * (MAX_Q - MIN_Q);
        let g = (PI * frequency_hz / sample_rate as f64).tan();
        let k = 1.0 / (2.0 * q_actual);
        (k, g)
    }

    #[inline]
    pub fn k(&self) -> f64 {
        self.k
    }

    #[inline]
    pub fn g(&self) -> f64 {
        self.g
    }

    pub fn k_target(&self) -> f64 {
        self.k_target
    }

    pub fn g_target(&self) -> f64 {
        self.g_target
    }

    pub fn smooth_factor(&self) -> f64 {
        self.smooth_factor
    }
}

impl Default for CoefficientState {
    fn default() -> Self {
        Self::new()
    }
}

/// One allpass stage. Holds only integrator memory; coefficients are lent
/// per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllpassStage {
    s1: f64,
    s2: f64,
}

impl AllpassStage {
    pub fn new() -> Self {
        Self { s1: 0.0, s2: 0.0 }
    }

    #[inline]
    pub fn process(&mut self, x: f32, coefficients: &CoefficientState) -> f32 {
        let g = coefficients.g;
        let k = coefficients.k;
        debug_assert!(g.is_finite() && k.is_finite(), "allpass coefficients not finite");

        let x = x as f64;
        let d = 1.0 / (1.0 + 2.0 * k * g + g * g);
        let bp = (g * (x - self.s2) + self.s1) * d;

        let bp2 = bp + bp;
        let s1 = bp2 - self.s1;
        let s2 = self.s2 + g * bp2;

        self.s1 = if s1.abs() < DENORMAL_FLOOR { 0.0 } else { s1 };
        self.s2 = if s2.abs() < DENORMAL_FLOOR { 0.0 } else { s2 };

        (x - 4.0 * k * bp) as f32
    }

    /// Process a buffer in place with fixed coefficients.
    pub fn render(&mut self, buffer: &mut [f32], coefficients: &CoefficientState) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample, coefficients);
        }
    }

    pub fn reset(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
    }

    /// Integrator memory `(s1, s2)`.
    pub fn state(&self) -> (f64, f64) {
        (self.s1, self.s2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 48_000;

    fn sine(freq: f64, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| 0.5 * (std::f64::consts::TAU * freq * i as f64 / SAMPLE_RATE as f64).sin() as f32)
            .collect()
    }

    fn rms(buffer: &[f32]) -> f32 {
        (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt()
    }

    #[test]
    fn test_targets_map_resonance_to_q() {
        let (k_low, _) = CoefficientState::targets(1000.0, 0.0, SAMPLE_RATE);
        let (k_high, _) = CoefficientState::targets(1000.0, 1.0, SAMPLE_RATE);
        assert!((k_low - 1.0).abs() < 1e-12, "Q 0.5 should give k = 1, got {k_low}");
        assert!((k_high - 0.05).abs() < 1e-12, "Q 10 should give k = 0.05, got {k_high}");
    }

    #[test]
    fn test_targets_warp_frequency() {
        let (_, g) = CoefficientState::targets(12_000.0, 0.5, SAMPLE_RATE);
        // pi * 12k / 48k = pi / 4, tan = 1
        assert!((g - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_coefficients_converge_and_snap() {
        let mut state = CoefficientState::new();
        state.set_smooth_time(COEFFICIENT_SMOOTH_MS, SAMPLE_RATE);

        // One time constant (5 ms = 240 samples) closes ~63% of the gap
        for _ in 0..240 {
            state.update(1000.0, 0.3, SAMPLE_RATE);
        }
        let remaining = (state.g_target() - state.g()) / state.g_target();
        assert!(
            (remaining - (-1.0f64).exp()).abs() < 0.01,
            "expected ~36.8% of the gap left after one time constant, got {remaining}"
        );

        for _ in 0..20_000 {
            state.update(1000.0, 0.3, SAMPLE_RATE);
        }
        assert_eq!(state.g(), state.g_target());
        assert_eq!(state.k(), state.k_target());
    }

    #[test]
    fn test_convergence_is_monotonic() {
        let mut state = CoefficientState::new();
        state.set_smooth_time(COEFFICIENT_SMOOTH_MS, SAMPLE_RATE);

        let mut prev_gap = f64::MAX;
        for _ in 0..2_000 {
            state.update(2000.0, 0.8, SAMPLE_RATE);
            let gap = (state.g_target() - state.g()).abs();
            assert!(gap <= prev_gap);
            prev_gap = gap;
        }
    }

    #[test]
    fn test_unity_magnitude_for_sine() {
        let mut coefficients = CoefficientState::new();
        coefficients.snap_to(1000.0, 0.5, SAMPLE_RATE);

        for &freq in &[100.0, 1000.0, 5000.0, 15_000.0] {
            let mut stage = AllpassStage::new();
            let input = sine(freq, 52_800);
            let mut output = input.clone();
            stage.render(&mut output, &coefficients);

            // Skip the first 100 ms of transient
            let ratio = rms(&output[4800..]) / rms(&input[4800..]);
            assert!(
                (ratio - 1.0).abs() < 0.01,
                "expected unity gain at {freq} Hz, got ratio {ratio}"
            );
        }
    }

    #[test]
    fn test_phase_shift_is_nonzero() {
        let mut coefficients = CoefficientState::new();
        coefficients.snap_to(1000.0, 0.5, SAMPLE_RATE);

        let mut stage = AllpassStage::new();
        let input = sine(1000.0, 9_600);
        let mut output = input.clone();
        stage.render(&mut output, &coefficients);

        let diff: f32 = input[4800..]
            .iter()
            .zip(&output[4800..])
            .map(|(a, b)| (a - b).abs())
            .sum();
        assert!(diff > 1.0, "allpass at its centre frequency should shift phase");
    }

    #[test]
    fn test_denormal_floor_after_silence() {
        let mut coefficients = CoefficientState::new();
        coefficients.snap_to(1000.0, 0.0, SAMPLE_RATE);

        let mut stage = AllpassStage::new();
        stage.process(1.0, &coefficients);
        for _ in 0..48_000 {
            stage.process(0.0, &coefficients);
        }

        assert_eq!(stage.state(), (0.0, 0.0));
    }

    #[test]
    fn test_reset_clears_memory() {
        let mut coefficients = CoefficientState::new();
        coefficients.snap_to(500.0, 0.2, SAMPLE_RATE);

        let mut stage = AllpassStage::new();
        stage.process(0.8, &coefficients);
        assert_ne!(stage.state(), (0.0, 0.0));

        stage.reset();
        assert_eq!(stage.state(), (0.0, 0.0));
    }
}
