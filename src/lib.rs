pub mod config;
pub mod control; // Live control messages for the audio thread
pub mod dsp;
pub mod effect; // Circulate signal path and block processor
pub mod params; // Parameter ids and sample-accurate automation
pub mod state;

pub use config::{ChannelLayout, ConfigError, ProcessSetup};
pub use control::{ControlMessage, ControlReceiver};
pub use effect::{CirculateEffect, CirculateProcessor};
pub use params::{AudioEffectParameters, AutomationPoint, ParamChanges, ParamId, ParamUnit};
pub use state::{PersistedState, StateError};

pub const MAX_BLOCK_SIZE: usize = 2048;
/// Capacity of the allpass cascade.
pub const MAX_NUM_STAGES: usize = 64;
pub const MAX_CHANNELS: usize = 2;
