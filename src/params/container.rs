use super::{AutomationPoint, ParamId, ParamUnit};
use crate::config::ProcessSetup;

/// Every automated parameter of the effect, shared by all channels.
///
/// Written once per block (pre-fill, automation, smoothing) before any
/// channel reads it.
#[derive(Debug, Clone)]
pub struct AudioEffectParameters {
    pub depth: ParamUnit,
    pub center: ParamUnit,
    pub note: ParamUnit,
    pub focus: ParamUnit,
    pub center_type: ParamUnit,
    pub note_offset: ParamUnit,
    pub feedback: ParamUnit,
    block_len: usize,
}

impl AudioEffectParameters {
    pub fn new(setup: &ProcessSetup) -> Self {
        let build = |id: ParamId| {
            let mut unit = ParamUnit::new(id, id.default_value(), setup.max_block_size);
            unit.set_smooth_time(id.smooth_time_ms(), setup.sample_rate as f32);
            unit
        };

        Self {
            depth: build(ParamId::Depth),
            center: build(ParamId::Center),
            note: build(ParamId::Note),
            focus: build(ParamId::Focus),
            center_type: build(ParamId::CenterType),
            note_offset: build(ParamId::NoteOffset),
            feedback: build(ParamId::Feedback),
            block_len: 0,
        }
    }

    /// Re-derive smoothing and buffer capacity for a new setup, keeping the
    /// current values.
    pub fn configure(&mut self, setup: &ProcessSetup) {
        for unit in self.iter_mut() {
            unit.set_capacity(setup.max_block_size);
            unit.set_smooth_time(unit.id().smooth_time_ms(), setup.sample_rate as f32);
        }
        self.block_len = self.block_len.min(setup.max_block_size);
    }

    /// Look up a parameter. Bypass is not a sample-accurate parameter and
    /// returns `None`.
    pub fn get(&self, id: ParamId) -> Option<&ParamUnit> {
        match id {
            ParamId::Depth => Some(&self.depth),
            ParamId::Center => Some(&self.center),
            ParamId::Note => Some(&self.note),
            ParamId::Focus => Some(&self.focus),
            ParamId::CenterType => Some(&self.center_type),
            ParamId::NoteOffset => Some(&self.note_offset),
            ParamId::Feedback => Some(&self.feedback),
            ParamId::Bypass => None,
        }
    }

    pub fn get_mut(&mut self, id: ParamId) -> Option<&mut ParamUnit> {
        match id {
            ParamId::Depth => Some(&mut self.depth),
            ParamId::Center => Some(&mut self.center),
            ParamId::Note => Some(&mut self.note),
            ParamId::Focus => Some(&mut self.focus),
            ParamId::CenterType => Some(&mut self.center_type),
            ParamId::NoteOffset => Some(&mut self.note_offset),
            ParamId::Feedback => Some(&mut self.feedback),
            ParamId::Bypass => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamUnit> {
        [
            &self.depth,
            &self.center,
            &self.note,
            &self.focus,
            &self.center_type,
            &self.note_offset,
            &self.feedback,
        ]
        .into_iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ParamUnit> {
        [
            &mut self.depth,
            &mut self.center,
            &mut self.note,
            &mut self.focus,
            &mut self.center_type,
            &mut self.note_offset,
            &mut self.feedback,
        ]
        .into_iter()
    }

    /// Pre-fill every parameter for a block of `num_samples`.
    pub fn begin_block(&mut self, num_samples: usize) {
        for unit in self.iter_mut() {
            unit.begin_block(num_samples);
        }
        self.block_len = self.depth.block_len();
    }

    /// Apply one parameter's automation points to the current block.
    pub fn apply_changes(&mut self, id: ParamId, points: &[AutomationPoint], base_offset: usize) {
        if let Some(unit) = self.get_mut(id) {
            unit.apply_points(points, base_offset);
        }
    }

    /// Smooth every parameter, including those without new automation, so
    /// smoothing carries across block boundaries.
    pub fn smooth_all(&mut self) {
        for unit in self.iter_mut() {
            unit.smooth();
        }
    }

    /// Number of samples in the current block.
    pub fn block_len(&self) -> usize {
        self.block_len
    }
}
