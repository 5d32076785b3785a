//! Test signals to feed through the effect

use std::str::FromStr;

use color_eyre::eyre::{eyre, Report};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Band-rich sawtooth at 110 Hz
    Saw,
    /// White noise
    Noise,
    /// Short clicks twice a second
    Pulse,
}

impl SourceKind {
    pub fn name(self) -> &'static str {
        match self {
            SourceKind::Saw => "saw",
            SourceKind::Noise => "noise",
            SourceKind::Pulse => "pulse",
        }
    }
}

impl FromStr for SourceKind {
    type Err = Report;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "saw" => Ok(SourceKind::Saw),
            "noise" => Ok(SourceKind::Noise),
            "pulse" => Ok(SourceKind::Pulse),
            other => Err(eyre!("unknown source '{other}' (expected saw, noise or pulse)")),
        }
    }
}

const SAW_HZ: f32 = 110.0;
const PULSE_HZ: f32 = 2.0;
const LEVEL: f32 = 0.5;

/// Mono test-signal generator. Allocation-free.
pub struct TestSource {
    kind: SourceKind,
    phase: f32,
    increment: f32,
    rng: u32,
}

impl TestSource {
    pub fn new(kind: SourceKind, sample_rate: f32) -> Self {
        let rate = match kind {
            SourceKind::Pulse => PULSE_HZ,
            _ => SAW_HZ,
        };

        Self {
            kind,
            phase: 0.0,
            increment: rate / sample_rate,
            rng: 0x1234_5678,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    fn next_sample(&mut self) -> f32 {
        let value = match self.kind {
            SourceKind::Saw => 2.0 * self.phase - 1.0,
            SourceKind::Noise => {
                // xorshift32
                self.rng ^= self.rng << 13;
                self.rng ^= self.rng >> 17;
                self.rng ^= self.rng << 5;
                self.rng as f32 / u32::MAX as f32 * 2.0 - 1.0
            }
            SourceKind::Pulse => {
                if self.phase < self.increment {
                    1.0
                } else {
                    0.0
                }
            }
        };

        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        value * LEVEL
    }
}
