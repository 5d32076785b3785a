//! Frequency helpers: note conversion, log ranges and the safe ceiling.

/*
Frequency Mapping
=================

The centre frequency can be driven two ways.

Hz mode: a normalized control in [0, 1] is spread logarithmically between
MIN_FREQ_HZ and the maximum allowed frequency, so equal knob travel gives
equal musical intervals:

    freq = min * (max / min) ^ normalized

    normalized   0.0    0.25    0.5     0.75    1.0
    Hz (48k)     20     110     600     3290    18000

Note mode: a note number selects a pitch, 440 * 2^((note - 69) / 12), and a
fine control shifts it up to an octave either way.

The ceiling is 18 kHz unless the Nyquist frequency is lower, in which case
it is Nyquist minus a 500 Hz margin. tan(pi * f / fs) blows up at Nyquist,
so the allpass coefficients must stay clear of it.
*/

/// Lowest centre frequency.
pub const MIN_FREQ_HZ: f64 = 20.0;
/// Highest centre frequency at ordinary sample rates.
pub const MAX_FREQ_HZ: f64 = 18_000.0;
/// Margin kept below Nyquist when Nyquist is under `MAX_FREQ_HZ`.
pub const NYQUIST_MARGIN_HZ: f64 = 500.0;
/// Number of selectable notes (0..=127).
pub const MAX_NOTE_NUM: u8 = 128;

/// Convert a MIDI note number to Hz. A4 = 440 Hz = note 69.
#[inline]
pub fn note_to_hz(note: f64) -> f64 {
    440.0 * 2.0_f64.powf((note - 69.0) / 12.0)
}

/// Select an integer note from a normalized control.
///
/// Truncates `normalized * 128` and clamps to 127, so the normalized
/// position `i / 127` of a 128-entry note list maps back to note `i`.
#[inline]
pub fn normalized_to_note(normalized: f32) -> u8 {
    let note = (normalized.clamp(0.0, 1.0) as f64 * MAX_NOTE_NUM as f64) as u32;
    note.min(MAX_NOTE_NUM as u32 - 1) as u8
}

/// Highest centre frequency allowed at this sample rate.
pub fn max_allowed_hz(sample_rate: u32) -> f64 {
    let nyquist = sample_rate as f64 / 2.0;

    if nyquist < MAX_FREQ_HZ {
        nyquist - NYQUIST_MARGIN_HZ
    } else {
        MAX_FREQ_HZ
    }
}

/// Octave multiplier for a normalized fine-offset control.
///
/// 0.0 → one octave down, 0.5 → unchanged, 1.0 → one octave up.
#[inline]
pub fn octave_offset_ratio(offset: f32) -> f64 {
    2.0_f64.powf(2.0 * offset as f64 - 1.0)
}

/// Logarithmic mapping between `[0, 1]` and `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogRange {
    pub min: f64,
    pub max: f64,
}

impl LogRange {
    const EPSILON: f64 = 1e-10;

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn to_plain(&self, normalized: f64) -> f64 {
        if normalized <= Self::EPSILON {
            return self.min;
        }
        if normalized >= 1.0 - Self::EPSILON {
            return self.max;
        }
        self.min * (self.max / self.min).powf(normalized)
    }

    #[inline]
    pub fn to_normalized(&self, plain: f64) -> f64 {
        if plain <= self.min {
            return 0.0;
        }
        if plain >= self.max {
            return 1.0;
        }
        (plain / self.min).ln() / (self.max / self.min).ln()
    }
}
