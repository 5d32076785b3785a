//! Shared state types for UI communication
//!
//! Static data is built once before the stream starts; the per-callback
//! status update is `Copy` and allocation-free.

use circulate_dsp::{ParamId, PersistedState};

use crate::source::SourceKind;

/// Static state handed to the UI at startup (can allocate)
#[derive(Clone, Debug)]
pub struct UiInit {
    pub sample_rate: u32,
    pub source: SourceKind,
    /// Starting value of every control
    pub state: PersistedState,
}

impl UiInit {
    pub fn new(sample_rate: u32, source: SourceKind, state: PersistedState) -> Self {
        Self {
            sample_rate,
            source,
            state,
        }
    }
}

/// What the audio thread reports back after each callback
#[derive(Clone, Copy, Debug, Default)]
pub struct EffectStatus {
    pub center_hz: f64,
    pub active_stages: usize,
    pub bypassed: bool,
}

/// The UI's copy of the controls.
///
/// The audio thread owns the real values; this mirrors what was last sent.
#[derive(Clone, Debug)]
pub struct Knobs {
    /// Adjustable parameters, in display order
    pub ids: Vec<ParamId>,
    pub values: Vec<f32>,
    pub selected: usize,
    pub bypassed: bool,
}

impl Knobs {
    pub fn from_state(state: &PersistedState) -> Self {
        let ids: Vec<ParamId> = ParamId::ALL
            .into_iter()
            .filter(|&id| id != ParamId::Bypass)
            .collect();
        let values = ids.iter().map(|&id| state.value(id) as f32).collect();

        Self {
            ids,
            values,
            selected: 0,
            bypassed: state.is_bypassed(),
        }
    }

    pub fn selected_id(&self) -> ParamId {
        self.ids[self.selected]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.ids.len();
    }

    pub fn select_previous(&mut self) {
        self.selected = (self.selected + self.ids.len() - 1) % self.ids.len();
    }

    /// Nudge the selected control and return its new value.
    ///
    /// The Hz/note switch flips instead of moving by `delta`.
    pub fn nudge(&mut self, delta: f32) -> f32 {
        let value = &mut self.values[self.selected];
        *value = if self.ids[self.selected] == ParamId::CenterType {
            if *value >= 0.5 {
                0.0
            } else {
                1.0
            }
        } else {
            (*value + delta).clamp(0.0, 1.0)
        };
        *value
    }
}
