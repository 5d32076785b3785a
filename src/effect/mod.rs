//! The circulate effect: per-channel signal path and the multi-channel
//! block processor that drives it.

mod circulate;
mod processor;

pub use circulate::{
    effective_feedback, feedback_gain, stage_count, CirculateEffect, FEEDBACK_DEAD_ZONE,
    FEEDBACK_SCALE, NOTE_SMOOTH_MS,
};
pub use processor::CirculateProcessor;
