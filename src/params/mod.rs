//! Parameter system: identifiers, host automation points, and the
//! sample-accurate automation engine.

/*
Sample-Accurate Automation
==========================

Hosts send parameter changes sparsely: a handful of (offset, value) points
per block, or none at all. The DSP loop wants a value for every sample. Each
ParamUnit rebuilds a dense per-sample buffer every block in three passes:

  1. Pre-fill     buffer = [last, last, last, ...]
                  (no automation this block → value simply holds)

  2. Events       points (0, 0.2), (10, 0.8) over 20 samples:

                  index   0 ... 9   10 ... 19
                  value   0.2       0.8

                  Each point's value holds until the next point. Points with
                  the same offset: the last one wins.

  3. Smoothing    a one-pole filter runs over the buffer in order:
                      value += (raw - value) * smooth_factor
                  Its memory is carried into the next block, so a ramp that
                  is still moving at the end of one block keeps moving into
                  the next instead of restarting (restarting clicks).

Discrete controls (depth, note, Hz/note switch) skip step 3 and stay as
exact steps.

Bypass is not a ParamUnit: it is read once per block from the last point
of its queue.
*/

mod container;
mod unit;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use container::AudioEffectParameters;
pub use unit::ParamUnit;

/// Stable parameter identifiers. The numeric values are the host-facing
/// tags and never change.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ParamId {
    Depth = 100,
    Center = 101,
    Note = 102,
    Focus = 103,
    // 104 reserved
    CenterType = 105,
    NoteOffset = 106,
    Bypass = 107,
    Feedback = 108,
}

impl ParamId {
    /// Every parameter, in persisted-state order.
    pub const ALL: [ParamId; 8] = [
        ParamId::Depth,
        ParamId::Center,
        ParamId::Note,
        ParamId::Focus,
        ParamId::CenterType,
        ParamId::NoteOffset,
        ParamId::Bypass,
        ParamId::Feedback,
    ];

    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.raw() == raw)
    }

    pub fn raw(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            ParamId::Depth => "Depth",
            ParamId::Center => "Frequency",
            ParamId::Note => "Note",
            ParamId::Focus => "Focus",
            ParamId::CenterType => "Hz/Note",
            ParamId::NoteOffset => "Fine",
            ParamId::Bypass => "Bypass",
            ParamId::Feedback => "Feedback",
        }
    }

    /// Normalized default value.
    pub fn default_value(self) -> f32 {
        match self {
            ParamId::Depth => 0.5,
            ParamId::Center => 0.5,
            ParamId::Note => 0.5,
            ParamId::Focus => 0.5,
            ParamId::CenterType => 0.0,
            ParamId::NoteOffset => 0.5,
            ParamId::Bypass => 0.0,
            ParamId::Feedback => 0.5,
        }
    }

    /// Smoothing time in ms; 0 for discrete controls.
    pub fn smooth_time_ms(self) -> f32 {
        match self {
            ParamId::Center | ParamId::Focus | ParamId::NoteOffset => 20.0,
            ParamId::Feedback => 10.0,
            ParamId::Depth | ParamId::Note | ParamId::CenterType | ParamId::Bypass => 0.0,
        }
    }
}

/// One host automation point: `value` takes effect at sample `offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutomationPoint {
    pub offset: usize,
    pub value: f32,
}

impl AutomationPoint {
    pub fn new(offset: usize, value: f32) -> Self {
        Self { offset, value }
    }
}

/// All of one parameter's automation points for a block, ordered by offset.
#[derive(Debug, Clone, Copy)]
pub struct ParamChanges<'a> {
    pub id: ParamId,
    pub points: &'a [AutomationPoint],
}

impl<'a> ParamChanges<'a> {
    pub fn new(id: ParamId, points: &'a [AutomationPoint]) -> Self {
        Self { id, points }
    }

    /// Build from a host tag; `None` for tags this effect does not know.
    pub fn from_raw(raw: u32, points: &'a [AutomationPoint]) -> Option<Self> {
        ParamId::from_raw(raw).map(|id| Self { id, points })
    }

    /// Value of the last point, if any.
    pub fn last_value(&self) -> Option<f32> {
        self.points.last().map(|point| point.value)
    }
}
