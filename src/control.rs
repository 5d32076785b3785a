//! Live control messages sent to the audio thread.
//!
//! A UI thread pushes [`ControlMessage`]s into a lock-free queue; the audio
//! callback drains it at the top of each block.

use std::collections::VecDeque;

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::params::ParamId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlMessage {
    /// Set a parameter's explicit value; applies from the next block.
    SetParam { id: ParamId, value: f32 },
    SetBypass(bool),
    /// Clear all filter and feedback memory.
    Reset,
}

pub trait ControlReceiver {
    fn pop(&mut self) -> Option<ControlMessage>;
}

#[cfg(feature = "rtrb")]
impl ControlReceiver for Consumer<ControlMessage> {
    fn pop(&mut self) -> Option<ControlMessage> {
        Consumer::pop(self).ok()
    }
}

impl ControlReceiver for VecDeque<ControlMessage> {
    fn pop(&mut self) -> Option<ControlMessage> {
        self.pop_front()
    }
}
