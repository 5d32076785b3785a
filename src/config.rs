//! Processing setup and channel layout negotiation.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::frequency::{max_allowed_hz, MIN_FREQ_HZ},
    MAX_BLOCK_SIZE, MAX_CHANNELS,
};

/// Sample rate and block capacity the effect is prepared for.
///
/// Every per-sample buffer is sized from `max_block_size` at configuration
/// time, so the audio path never allocates.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessSetup {
    pub sample_rate: u32,
    pub max_block_size: usize,
}

impl ProcessSetup {
    pub fn new(sample_rate: u32, max_block_size: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        // The centre frequency range must not collapse
        if max_allowed_hz(self.sample_rate) <= MIN_FREQ_HZ {
            return Err(ConfigError::SampleRateTooLow {
                sample_rate: self.sample_rate,
            });
        }
        if self.max_block_size == 0 || self.max_block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::InvalidBlockSize {
                requested: self.max_block_size,
                limit: MAX_BLOCK_SIZE,
            });
        }
        Ok(())
    }
}

impl Default for ProcessSetup {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            max_block_size: MAX_BLOCK_SIZE,
        }
    }
}

/// Supported bus arrangements: one bus in, one bus out, same width.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelLayout {
    Mono,
    #[default]
    Stereo,
}

impl ChannelLayout {
    /// Negotiate a layout from the host's input and output channel counts.
    pub fn from_counts(inputs: usize, outputs: usize) -> Result<Self, ConfigError> {
        match (inputs, outputs) {
            (1, 1) => Ok(ChannelLayout::Mono),
            (2, 2) => Ok(ChannelLayout::Stereo),
            _ => Err(ConfigError::UnsupportedLayout { inputs, outputs }),
        }
    }

    pub fn channels(self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => MAX_CHANNELS,
        }
    }
}

/// Errors raised while preparing the effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Sample rate of zero
    ZeroSampleRate,
    /// Sample rate so low that no centre frequency fits below Nyquist
    SampleRateTooLow { sample_rate: u32 },
    /// Block size of zero or above the compiled-in capacity
    InvalidBlockSize { requested: usize, limit: usize },
    /// Anything other than mono→mono or stereo→stereo
    UnsupportedLayout { inputs: usize, outputs: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroSampleRate => write!(f, "Sample rate must be greater than zero"),
            ConfigError::SampleRateTooLow { sample_rate } => write!(
                f,
                "Sample rate {} Hz is too low: the centre frequency range would be empty",
                sample_rate
            ),
            ConfigError::InvalidBlockSize { requested, limit } => write!(
                f,
                "Block size {} is invalid: must be between 1 and {}",
                requested, limit
            ),
            ConfigError::UnsupportedLayout { inputs, outputs } => write!(
                f,
                "Unsupported channel layout: {} in / {} out (only mono or stereo, matching)",
                inputs, outputs
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
