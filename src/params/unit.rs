use std::f32::consts::TAU;

use super::{AutomationPoint, ParamId};

/// Gap below which a smoothed parameter snaps onto its raw value.
const SNAP_EPSILON: f32 = 1e-3;

/// One automation-controlled parameter with a dense per-sample buffer.
///
/// The buffer is allocated once at the maximum block size; each block only
/// uses its first `block_len` entries.
#[derive(Debug, Clone)]
pub struct ParamUnit {
    id: ParamId,
    /// Last value received verbatim from the host
    explicit: f32,
    /// One-pole memory, carried across blocks
    smoothed: f32,
    buffer: Vec<f32>,
    block_len: usize,
    smooth_factor: f32,
    wants_smoothing: bool,
}

impl ParamUnit {
    /// Create an unsmoothed parameter with room for `capacity` samples.
    pub fn new(id: ParamId, default_value: f32, capacity: usize) -> Self {
        Self {
            id,
            explicit: default_value,
            smoothed: default_value,
            buffer: vec![default_value; capacity],
            block_len: 0,
            smooth_factor: 1.0,
            wants_smoothing: false,
        }
    }

    pub fn id(&self) -> ParamId {
        self.id
    }

    /// Set the smoothing time. Zero (or less) disables smoothing.
    pub fn set_smooth_time(&mut self, time_ms: f32, sample_rate: f32) {
        if time_ms > 0.0 && sample_rate > 0.0 {
            self.smooth_factor = 1.0 - (-TAU / (time_ms * 0.001 * sample_rate)).exp();
            self.wants_smoothing = true;
        } else {
            self.smooth_factor = 1.0;
            self.wants_smoothing = false;
        }
    }

    pub fn wants_smoothing(&self) -> bool {
        self.wants_smoothing
    }

    pub fn smooth_factor(&self) -> f32 {
        self.smooth_factor
    }

    /// Change the buffer capacity. Allocates; never call from the audio path.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.buffer.resize(capacity, self.explicit);
        self.block_len = self.block_len.min(capacity);
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Start a block of `num_samples`: pre-fill with the last explicit value.
    pub fn begin_block(&mut self, num_samples: usize) {
        self.block_len = num_samples.min(self.buffer.len());
        let explicit = self.explicit;
        self.buffer[..self.block_len].fill(explicit);
    }

    /// Write host automation points into the current block as a step
    /// function.
    ///
    /// `base_offset` is subtracted from every point's offset (for sub-block
    /// processing). Offsets are trusted to be non-decreasing; one past the
    /// end of the block lands on the last sample. Values are clamped to
    /// `[0, 1]`.
    pub fn apply_points(&mut self, points: &[AutomationPoint], base_offset: usize) {
        let len = self.block_len;
        if len == 0 || points.is_empty() {
            return;
        }

        let mut current = self.explicit;
        let mut cursor = 0;

        for point in points {
            let offset = point.offset.saturating_sub(base_offset).min(len - 1);
            if offset > cursor {
                self.buffer[cursor..offset].fill(current);
                cursor = offset;
            }
            current = point.value.clamp(0.0, 1.0);
        }

        self.buffer[cursor..len].fill(current);
        self.explicit = current;
    }

    /// Run the one-pole smoother over the block in place.
    ///
    /// Discrete parameters keep their step buffer and adopt the explicit
    /// value directly.
    pub fn smooth(&mut self) {
        if !self.wants_smoothing {
            self.smoothed = self.explicit;
            return;
        }

        let factor = self.smooth_factor;
        let mut smoothed = self.smoothed;

        for value in self.buffer[..self.block_len].iter_mut() {
            let difference = *value - smoothed;
            if difference.abs() < SNAP_EPSILON {
                smoothed = *value;
            } else {
                smoothed += difference * factor;
            }
            *value = smoothed;
        }

        self.smoothed = smoothed;
    }

    /// Value for sample `index` of the current block.
    #[inline]
    pub fn value_at(&self, index: usize) -> f32 {
        debug_assert!(index < self.block_len, "parameter read past block end");
        self.buffer[index]
    }

    /// The current block's dense values.
    pub fn block(&self) -> &[f32] {
        &self.buffer[..self.block_len]
    }

    pub fn block_len(&self) -> usize {
        self.block_len
    }

    /// Last explicit (unsmoothed) value.
    pub fn last_value(&self) -> f32 {
        self.explicit
    }

    pub fn smoothed_value(&self) -> f32 {
        self.smoothed
    }

    /// Set the explicit value; it takes effect from the next block.
    pub fn set(&mut self, value: f32) {
        self.explicit = value.clamp(0.0, 1.0);
    }

    /// Fill the whole buffer with `value` and make it the explicit value.
    ///
    /// The smoother is left alone so a restored value is approached
    /// smoothly.
    pub fn fill_with(&mut self, value: f32) {
        let value = value.clamp(0.0, 1.0);
        self.explicit = value;
        self.buffer.fill(value);
    }

    /// Jump the smoother to the explicit value.
    pub fn snap_smoothed(&mut self) {
        self.smoothed = self.explicit;
    }
}
