use crate::{
    config::ProcessSetup,
    dsp::{
        allpass::COEFFICIENT_SMOOTH_MS,
        cascade::AllpassCascade,
        frequency::{
            max_allowed_hz, normalized_to_note, note_to_hz, octave_offset_ratio, LogRange,
            MIN_FREQ_HZ,
        },
        limiter::limit,
        smoother::ValueSmoother,
    },
    params::AudioEffectParameters,
    MAX_NUM_STAGES,
};

/*
Circulate
=========

One channel of the effect. Per sample:

          ┌──────────────── limit ←────────────────┐
          │                                        │ (previous output)
          ↓ × feedback                             │
  in ──→ (+) ──→ × gain comp ──→ [cascade × n] ──→ limit ──→ out

  1. read depth, frequency, focus, feedback for this sample
  2. focus^3 (more resolution at low Q, where the timbre moves most)
  3. update the shared coefficients once
  4. feedback: raw 0..1, dead zone around 0.5, rescaled to ±0.99;
     forced to 0 when no stages are active
  5. limit the previous output before feeding it back
  6. mix: x = in + feedback * previous
  7. gain compensation sqrt(1 - |feedback| / 1.5)
  8. run the active stages
  9. limit the result

Feedback
--------

    raw        0.0 ........ 0.4 ==== 0.5 ==== 0.6 ........ 1.0
    effective  -0.99        (exactly 0 in the dead zone)        +0.99

The dead zone makes "off" easy to hit on a knob or in automation.
Negative feedback emphasises different phase notches than positive
feedback, so both halves of the range are useful.

Frequency
---------

Hz mode maps the centre control logarithmically onto [20 Hz, max allowed].
Note mode converts the note to Hz, smooths the Hz value (smoothing note
numbers and converting afterwards would glide in pitch rather than in
frequency), applies the ±1 octave fine offset, then clamps to
[20 Hz, max allowed].
*/

/// Raw feedback edges of the dead zone, both inclusive.
pub const FEEDBACK_DEAD_ZONE: (f32, f32) = (0.4, 0.6);
/// Scale from centred raw feedback to effective feedback (±0.99).
pub const FEEDBACK_SCALE: f32 = 1.98;
/// Smoothing applied to the note-mode frequency, in ms.
pub const NOTE_SMOOTH_MS: f64 = 25.0;

/// Number of active stages for a normalized depth value (rounded).
#[inline]
pub fn stage_count(depth: f32) -> usize {
    let stages = (depth.max(0.0) as f64 * MAX_NUM_STAGES as f64 + 0.5) as usize;
    stages.min(MAX_NUM_STAGES)
}

/// Effective feedback for a raw normalized value.
///
/// Raw values within the dead zone (inclusive) give exactly zero, as does
/// an empty cascade.
#[inline]
pub fn effective_feedback(raw: f32, active_stages: usize) -> f32 {
    if active_stages == 0 {
        return 0.0;
    }

    let (low, high) = FEEDBACK_DEAD_ZONE;
    if (low..=high).contains(&raw) {
        return 0.0;
    }

    (raw - 0.5) * FEEDBACK_SCALE
}

/// Gain applied after mixing in feedback, keeping loudness roughly constant.
#[inline]
pub fn feedback_gain(feedback: f32) -> f32 {
    (1.0 - feedback.abs() / 1.5).sqrt()
}

/// Per-channel circulate processor.
///
/// Owns its cascade, coefficients and feedback memory. Parameters are
/// borrowed per block and shared with the other channels.
#[derive(Debug, Clone)]
pub struct CirculateEffect {
    cascade: AllpassCascade,
    note_smoother: ValueSmoother,
    sample_rate: u32,
    max_allowed_hz: f64,
    hz_range: LogRange,
    /// Last output, fed back on the next sample
    current_sample: f32,
    center_hz: f64,
    active_stages: usize,
}

impl CirculateEffect {
    pub fn new(setup: &ProcessSetup) -> Self {
        let max_allowed_hz = max_allowed_hz(setup.sample_rate);

        let mut cascade = AllpassCascade::new();
        cascade.set_smooth_time(COEFFICIENT_SMOOTH_MS, setup.sample_rate);
        let mut note_smoother = ValueSmoother::new();
        note_smoother.set_smooth_time(NOTE_SMOOTH_MS, setup.sample_rate as f64);

        Self {
            cascade,
            note_smoother,
            sample_rate: setup.sample_rate,
            max_allowed_hz,
            hz_range: LogRange::new(MIN_FREQ_HZ, max_allowed_hz),
            current_sample: 0.0,
            center_hz: 0.0,
            active_stages: 0,
        }
    }

    /// Derive sample-rate dependent values. Filter memory is kept.
    pub fn configure(&mut self, setup: &ProcessSetup) {
        self.sample_rate = setup.sample_rate;
        self.max_allowed_hz = max_allowed_hz(setup.sample_rate);
        self.hz_range = LogRange::new(MIN_FREQ_HZ, self.max_allowed_hz);

        self.cascade
            .set_smooth_time(COEFFICIENT_SMOOTH_MS, setup.sample_rate);
        self.note_smoother
            .set_smooth_time(NOTE_SMOOTH_MS, setup.sample_rate as f64);
    }

    /// Process one sample using parameter values at `index` of the current
    /// block.
    #[inline]
    pub fn process_sample(&mut self, input: f32, index: usize, params: &AudioEffectParameters) -> f32 {
        self.active_stages = stage_count(params.depth.value_at(index));
        self.center_hz = self.update_frequency(index, params);

        let focus = params.focus.value_at(index) as f64;
        let focus = focus * focus * focus;
        self.cascade
            .update_coefficients(self.center_hz, focus, self.sample_rate);

        let feedback = effective_feedback(params.feedback.value_at(index), self.active_stages);

        let previous = limit(self.current_sample);
        let mut sample = input + feedback * previous;
        sample *= feedback_gain(feedback);

        sample = self.cascade.process(sample, self.active_stages);
        self.current_sample = limit(sample);

        self.current_sample
    }

    /// Process a block from `input` into `output`.
    ///
    /// Runs for the shortest of the two buffers and the parameter block.
    pub fn process_block(&mut self, input: &[f32], output: &mut [f32], params: &AudioEffectParameters) {
        let len = input.len().min(output.len()).min(params.block_len());

        for (index, (out, &sample)) in output[..len].iter_mut().zip(&input[..len]).enumerate() {
            *out = self.process_sample(sample, index, params);
        }
    }

    /// Process a block in place.
    pub fn process_in_place(&mut self, buffer: &mut [f32], params: &AudioEffectParameters) {
        let len = buffer.len().min(params.block_len());

        for (index, sample) in buffer[..len].iter_mut().enumerate() {
            *sample = self.process_sample(*sample, index, params);
        }
    }

    /// Clear filter memory, feedback memory and the note smoother.
    pub fn reset(&mut self) {
        self.cascade.reset();
        self.note_smoother.reset();
        self.current_sample = 0.0;
    }

    fn update_frequency(&mut self, index: usize, params: &AudioEffectParameters) -> f64 {
        let note_mode = params.center_type.value_at(index) >= 0.5;

        if !note_mode {
            let normalized = params.center.value_at(index).clamp(0.0, 1.0) as f64;
            return self.hz_range.to_plain(normalized);
        }

        let note = normalized_to_note(params.note.value_at(index));
        let hz = self.note_smoother.next_value(note_to_hz(note as f64));
        let hz = hz * octave_offset_ratio(params.note_offset.value_at(index));

        hz.clamp(MIN_FREQ_HZ, self.max_allowed_hz)
    }

    /// Centre frequency used on the last processed sample.
    pub fn center_hz(&self) -> f64 {
        self.center_hz
    }

    /// Stage count used on the last processed sample.
    pub fn active_stages(&self) -> usize {
        self.active_stages
    }

    pub fn max_allowed_hz(&self) -> f64 {
        self.max_allowed_hz
    }

    pub fn cascade(&self) -> &AllpassCascade {
        &self.cascade
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dsp::allpass::{AllpassStage, CoefficientState},
        params::{AutomationPoint, ParamId},
    };

    fn setup() -> ProcessSetup {
        ProcessSetup::new(48_000, 512)
    }

    fn params_with(values: &[(ParamId, f32)], len: usize) -> AudioEffectParameters {
        let mut params = AudioEffectParameters::new(&setup());
        for &(id, value) in values {
            if let Some(unit) = params.get_mut(id) {
                unit.fill_with(value);
                unit.snap_smoothed();
            }
        }
        params.begin_block(len);
        params.smooth_all();
        params
    }

    #[test]
    fn test_stage_count_rounds() {
        assert_eq!(stage_count(0.0), 0);
        assert_eq!(stage_count(0.5), 32);
        assert_eq!(stage_count(1.0), 64);
        assert_eq!(stage_count(0.99 / 64.0), 1);
        assert_eq!(stage_count(0.49 / 64.0), 0);
        assert_eq!(stage_count(-1.0), 0);
        assert_eq!(stage_count(2.0), 64);
    }

    #[test]
    fn test_feedback_dead_zone() {
        for i in 400..=600 {
            let raw = i as f32 / 1000.0;
            assert_eq!(effective_feedback(raw, 8), 0.0, "raw {raw} leaked feedback");
        }
        assert_eq!(effective_feedback(0.4, 8), 0.0);
        assert_eq!(effective_feedback(0.6, 8), 0.0);
    }

    #[test]
    fn test_dead_zone_edges_are_exact() {
        let above = 0.6000001f32;
        let below = 0.3999999f32;
        assert!(above > 0.6 && below < 0.4);

        assert!(effective_feedback(above, 8) > 0.0, "{above} fell in the dead zone");
        assert!(effective_feedback(below, 8) < 0.0, "{below} fell in the dead zone");
        assert_eq!(effective_feedback(above, 8), (above - 0.5) * 1.98);
        assert_eq!(effective_feedback(below, 8), (below - 0.5) * 1.98);
    }

    #[test]
    fn test_feedback_range() {
        assert!((effective_feedback(1.0, 8) - 0.99).abs() < 1e-6);
        assert!((effective_feedback(0.0, 8) + 0.99).abs() < 1e-6);
        assert!(effective_feedback(0.7, 8) > 0.0);
        assert!(effective_feedback(0.3, 8) < 0.0);
    }

    #[test]
    fn test_feedback_off_without_stages() {
        assert_eq!(effective_feedback(1.0, 0), 0.0);
        assert_eq!(effective_feedback(0.0, 0), 0.0);
    }

    #[test]
    fn test_feedback_gain() {
        assert_eq!(feedback_gain(0.0), 1.0);
        let gain = feedback_gain(0.99);
        assert!((gain - (1.0f32 - 0.66).sqrt()).abs() < 1e-6);
        assert_eq!(feedback_gain(0.5), feedback_gain(-0.5));
    }

    #[test]
    fn test_zero_depth_passes_input_exactly() {
        let params = params_with(&[(ParamId::Depth, 0.0), (ParamId::Feedback, 1.0)], 256);
        let mut effect = CirculateEffect::new(&setup());

        let input: Vec<f32> = (0..256).map(|i| 0.9 * (i as f32 * 0.05).sin()).collect();
        let mut output = vec![0.0; 256];
        effect.process_block(&input, &mut output, &params);

        assert_eq!(input, output);
        assert_eq!(effect.active_stages(), 0);
    }

    #[test]
    fn test_hz_mode_maps_log_range() {
        let mut effect = CirculateEffect::new(&setup());

        for &(normalized, expected) in &[(0.0f32, 20.0), (0.5, 600.0), (1.0, 18_000.0)] {
            let params = params_with(&[(ParamId::Center, normalized)], 4);
            effect.process_sample(0.0, 0, &params);
            assert!(
                (effect.center_hz() - expected).abs() < 1e-6,
                "normalized {normalized} gave {} Hz",
                effect.center_hz()
            );
        }
    }

    #[test]
    fn test_note_mode_converges_to_note_frequency() {
        // Note position 69 of 128 selects A4
        let params = params_with(
            &[
                (ParamId::CenterType, 1.0),
                (ParamId::Note, 69.0 / 127.0),
                (ParamId::NoteOffset, 0.5),
            ],
            512,
        );
        let mut effect = CirculateEffect::new(&setup());
        let mut buffer = vec![0.0f32; 512];

        for _ in 0..20 {
            effect.process_in_place(&mut buffer, &params);
        }
        assert!((effect.center_hz() - 440.0).abs() < 1e-6, "got {}", effect.center_hz());
    }

    #[test]
    fn test_note_offset_shifts_octave() {
        let params = params_with(
            &[
                (ParamId::CenterType, 1.0),
                (ParamId::Note, 69.0 / 127.0),
                (ParamId::NoteOffset, 1.0),
            ],
            512,
        );
        let mut effect = CirculateEffect::new(&setup());
        let mut buffer = vec![0.0f32; 512];

        for _ in 0..20 {
            effect.process_in_place(&mut buffer, &params);
        }
        assert!((effect.center_hz() - 880.0).abs() < 1e-6, "got {}", effect.center_hz());
    }

    #[test]
    fn test_note_mode_clamps_after_offset() {
        let params = params_with(
            &[
                (ParamId::CenterType, 1.0),
                (ParamId::Note, 1.0),
                (ParamId::NoteOffset, 1.0),
            ],
            512,
        );
        let mut effect = CirculateEffect::new(&setup());
        let mut buffer = vec![0.0f32; 512];

        for _ in 0..20 {
            effect.process_in_place(&mut buffer, &params);
        }
        assert_eq!(effect.center_hz(), effect.max_allowed_hz());

        let params = params_with(
            &[
                (ParamId::CenterType, 1.0),
                (ParamId::Note, 0.0),
                (ParamId::NoteOffset, 0.0),
            ],
            512,
        );
        let mut effect = CirculateEffect::new(&setup());
        effect.process_in_place(&mut buffer, &params);
        assert_eq!(effect.center_hz(), MIN_FREQ_HZ);
    }

    #[test]
    fn test_max_allowed_follows_sample_rate() {
        let effect = CirculateEffect::new(&ProcessSetup::new(32_000, 256));
        assert_eq!(effect.max_allowed_hz(), 15_500.0);
    }

    #[test]
    fn test_new_derives_range_without_configure() {
        let low_rate = ProcessSetup::new(32_000, 256);
        let mut fresh = CirculateEffect::new(&low_rate);
        let mut reconfigured = CirculateEffect::new(&setup());
        reconfigured.configure(&low_rate);

        for &normalized in &[0.0f32, 0.25, 0.5, 1.0] {
            let params = params_with(&[(ParamId::Center, normalized)], 4);
            fresh.process_sample(0.0, 0, &params);
            reconfigured.process_sample(0.0, 0, &params);
            assert_eq!(fresh.center_hz(), reconfigured.center_hz(), "normalized {normalized}");
        }
        assert_eq!(fresh.center_hz(), 15_500.0);
    }

    #[test]
    fn test_feedback_path_matches_step_by_step_reference() {
        let raw_feedback = 0.9;
        let params = params_with(
            &[
                (ParamId::Depth, 1.0 / MAX_NUM_STAGES as f32),
                (ParamId::Feedback, raw_feedback),
                (ParamId::Center, 0.5),
                (ParamId::Focus, 0.5),
                (ParamId::CenterType, 0.0),
            ],
            32,
        );

        let mut effect = CirculateEffect::new(&setup());
        let center_hz = effect.hz_range.to_plain(0.5);
        let resonance = 0.125;
        effect
            .cascade
            .coefficients_mut()
            .snap_to(center_hz, resonance, 48_000);

        let mut coefficients = CoefficientState::new();
        coefficients.snap_to(center_hz, resonance, 48_000);
        let mut stage = AllpassStage::new();

        let feedback = effective_feedback(raw_feedback, 1);
        assert!((feedback - 0.792).abs() < 1e-6);
        let gain = (1.0 - feedback.abs() / 1.5).sqrt();

        let mut input = vec![1.0, 0.0, 0.0, 0.0];
        input.extend_from_slice(&[3.0; 8]);
        input.extend_from_slice(&[-2.5; 4]);
        input.extend_from_slice(&[0.5, 0.0, 0.0, 0.0]);

        let mut previous_output = 0.0f32;
        let mut limiter_engaged = false;

        for (index, &x) in input.iter().enumerate() {
            let previous = limit(previous_output);
            let mixed = (x + feedback * previous) * gain;
            let unlimited = stage.process(mixed, &coefficients);
            limiter_engaged |= unlimited.abs() > 0.99;
            let expected = limit(unlimited);
            previous_output = expected;

            let actual = effect.process_sample(x, index, &params);
            assert_eq!(actual, expected, "sample {index}");
        }

        assert_eq!(effect.active_stages(), 1);
        assert!(limiter_engaged, "input never drove the limiter");
    }

    #[test]
    fn test_depth_switches_per_sample() {
        let mut params = AudioEffectParameters::new(&setup());
        params.begin_block(16);
        params.apply_changes(
            ParamId::Depth,
            &[AutomationPoint::new(0, 0.0), AutomationPoint::new(8, 1.0)],
            0,
        );
        params.smooth_all();

        let mut effect = CirculateEffect::new(&setup());
        for i in 0..8 {
            effect.process_sample(0.1, i, &params);
            assert_eq!(effect.active_stages(), 0);
        }
        effect.process_sample(0.1, 8, &params);
        assert_eq!(effect.active_stages(), MAX_NUM_STAGES);
    }

    #[test]
    fn test_output_stays_bounded_with_heavy_feedback() {
        let params = params_with(
            &[
                (ParamId::Depth, 1.0),
                (ParamId::Feedback, 1.0),
                (ParamId::Focus, 1.0),
            ],
            512,
        );
        let mut effect = CirculateEffect::new(&setup());
        let mut buffer = vec![0.0f32; 512];

        for block in 0..40 {
            for (i, sample) in buffer.iter_mut().enumerate() {
                *sample = if (block * 512 + i) % 97 < 48 { 3.0 } else { -3.0 };
            }
            effect.process_in_place(&mut buffer, &params);
            assert!(buffer.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
        }
    }

    #[test]
    fn test_reset_clears_memory() {
        let params = params_with(&[(ParamId::Depth, 1.0)], 64);
        let mut effect = CirculateEffect::new(&setup());
        let mut buffer = vec![0.5f32; 64];
        effect.process_in_place(&mut buffer, &params);
        assert!(!effect.cascade().is_silent());

        effect.reset();
        assert!(effect.cascade().is_silent());
    }
}
