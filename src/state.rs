//! Persisted parameter state.
//!
//! The host stores the last explicit value of every control between
//! sessions. The binary form is eight little-endian `f64`s in a fixed field
//! order, which must never change:
//!
//! ```text
//! offset  0  depth
//!         8  center
//!        16  note
//!        24  focus
//!        32  center type
//!        40  note offset
//!        48  bypass
//!        56  feedback
//! ```

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::params::ParamId;

/// Last explicit normalized value of every control.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersistedState {
    pub depth: f64,
    pub center: f64,
    pub note: f64,
    pub focus: f64,
    pub center_type: f64,
    pub note_offset: f64,
    pub bypass: f64,
    pub feedback: f64,
}

impl PersistedState {
    /// Size of the binary form in bytes.
    pub const ENCODED_LEN: usize = ParamId::ALL.len() * 8;

    /// Field values in persisted order (same order as `ParamId::ALL`).
    pub fn fields(&self) -> [f64; 8] {
        [
            self.depth,
            self.center,
            self.note,
            self.focus,
            self.center_type,
            self.note_offset,
            self.bypass,
            self.feedback,
        ]
    }

    fn from_fields(fields: [f64; 8]) -> Self {
        let [depth, center, note, focus, center_type, note_offset, bypass, feedback] = fields;
        Self {
            depth,
            center,
            note,
            focus,
            center_type,
            note_offset,
            bypass,
            feedback,
        }
    }

    pub fn value(&self, id: ParamId) -> f64 {
        match id {
            ParamId::Depth => self.depth,
            ParamId::Center => self.center,
            ParamId::Note => self.note,
            ParamId::Focus => self.focus,
            ParamId::CenterType => self.center_type,
            ParamId::NoteOffset => self.note_offset,
            ParamId::Bypass => self.bypass,
            ParamId::Feedback => self.feedback,
        }
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypass > 0.5
    }

    /// Every field must be finite.
    pub fn validate(&self) -> Result<(), StateError> {
        for (id, value) in ParamId::ALL.into_iter().zip(self.fields()) {
            if !value.is_finite() {
                return Err(StateError::NonFinite { field: id });
            }
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> [u8; Self::ENCODED_LEN] {
        let mut bytes = [0u8; Self::ENCODED_LEN];
        for (chunk, value) in bytes.chunks_exact_mut(8).zip(self.fields()) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Decode and validate the binary form. Trailing bytes are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StateError> {
        if bytes.len() < Self::ENCODED_LEN {
            return Err(StateError::Truncated {
                expected: Self::ENCODED_LEN,
                actual: bytes.len(),
            });
        }

        let mut fields = [0.0f64; 8];
        for (field, chunk) in fields.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            *field = f64::from_le_bytes(raw);
        }

        let state = Self::from_fields(fields);
        state.validate()?;
        Ok(state)
    }
}

impl Default for PersistedState {
    fn default() -> Self {
        Self::from_fields(ParamId::ALL.map(|id| id.default_value() as f64))
    }
}

/// Errors raised while restoring persisted state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// Fewer bytes than the fixed layout needs
    Truncated { expected: usize, actual: usize },
    /// A field was NaN or infinite
    NonFinite { field: ParamId },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::Truncated { expected, actual } => write!(
                f,
                "State truncated: expected {} bytes, got {}",
                expected, actual
            ),
            StateError::NonFinite { field } => {
                write!(f, "State field '{}' is not a finite number", field.name())
            }
        }
    }
}

impl std::error::Error for StateError {}
