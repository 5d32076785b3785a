use tracing::{debug, info};

use super::circulate::CirculateEffect;
use crate::{
    config::{ChannelLayout, ConfigError, ProcessSetup},
    control::{ControlMessage, ControlReceiver},
    params::{AudioEffectParameters, ParamChanges, ParamId},
    state::{PersistedState, StateError},
    MAX_CHANNELS,
};

/*
Block Processing
================

For every host block:

  1. bypass       read once, from the last point of its queue
  2. pre-fill     every parameter buffer ← last explicit value
  3. automation   sparse points → dense step buffers
  4. smoothing    all parameters, changed or not
  5. channels     bypassed: copy input to output
                  otherwise: each channel's CirculateEffect, all reading
                  the same parameter buffers

Steps 2-5 run per sub-block when the host hands over more samples than the
configured maximum; automation offsets are rebased onto each sub-block.
*/

/// The effect as a whole: shared parameters plus one processor per channel.
#[derive(Debug, Clone)]
pub struct CirculateProcessor {
    setup: ProcessSetup,
    layout: ChannelLayout,
    params: AudioEffectParameters,
    channels: [CirculateEffect; MAX_CHANNELS],
    bypassed: bool,
}

impl CirculateProcessor {
    pub fn new(setup: ProcessSetup) -> Result<Self, ConfigError> {
        setup.validate()?;

        info!(
            sample_rate = setup.sample_rate,
            max_block_size = setup.max_block_size,
            "creating circulate processor"
        );

        Ok(Self {
            setup,
            layout: ChannelLayout::default(),
            params: AudioEffectParameters::new(&setup),
            channels: std::array::from_fn(|_| CirculateEffect::new(&setup)),
            bypassed: false,
        })
    }

    /// Prepare for a new sample rate or block size. Parameter values and
    /// filter memory are kept.
    pub fn configure(&mut self, setup: ProcessSetup) -> Result<(), ConfigError> {
        setup.validate()?;

        self.setup = setup;
        self.params.configure(&setup);
        for channel in self.channels.iter_mut() {
            channel.configure(&setup);
        }

        info!(
            sample_rate = setup.sample_rate,
            max_block_size = setup.max_block_size,
            max_allowed_hz = self.channels[0].max_allowed_hz(),
            "configured circulate processor"
        );
        Ok(())
    }

    /// Negotiate the bus arrangement. Only mono→mono and stereo→stereo are
    /// accepted.
    pub fn set_channel_layout(
        &mut self,
        inputs: usize,
        outputs: usize,
    ) -> Result<ChannelLayout, ConfigError> {
        let layout = ChannelLayout::from_counts(inputs, outputs).inspect_err(|err| {
            debug!(%err, "rejected channel layout");
        })?;
        self.layout = layout;
        debug!(?layout, "channel layout set");
        Ok(layout)
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn setup(&self) -> ProcessSetup {
        self.setup
    }

    pub fn params(&self) -> &AudioEffectParameters {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut AudioEffectParameters {
        &mut self.params
    }

    pub fn channel(&self, index: usize) -> Option<&CirculateEffect> {
        self.channels.get(index)
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    pub fn set_bypassed(&mut self, bypassed: bool) {
        self.bypassed = bypassed;
    }

    /// Process `num_samples` from `inputs` into `outputs`.
    ///
    /// Runs `min(inputs, outputs, layout)` channels; `num_samples` is
    /// capped at the shortest buffer in use. Empty blocks are no-ops.
    pub fn process(
        &mut self,
        num_samples: usize,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        changes: &[ParamChanges],
    ) {
        let channels = inputs.len().min(outputs.len()).min(self.layout.channels());
        let num_samples = inputs[..channels]
            .iter()
            .map(|buffer| buffer.len())
            .chain(outputs[..channels].iter().map(|buffer| buffer.len()))
            .fold(num_samples, usize::min);
        if channels == 0 || num_samples == 0 {
            return;
        }

        self.read_bypass(changes);

        let mut start = 0;
        while start < num_samples {
            let end = start + (num_samples - start).min(self.setup.max_block_size);
            self.prepare_block(start, end, num_samples, changes);

            for (index, channel) in self.channels[..channels].iter_mut().enumerate() {
                let input = &inputs[index][start..end];
                let output = &mut outputs[index][start..end];

                if self.bypassed {
                    output.copy_from_slice(input);
                } else {
                    channel.process_block(input, output, &self.params);
                }
            }

            start = end;
        }
    }

    /// Process `num_samples` of each buffer in place.
    pub fn process_in_place(
        &mut self,
        num_samples: usize,
        buffers: &mut [&mut [f32]],
        changes: &[ParamChanges],
    ) {
        let channels = buffers.len().min(self.layout.channels());
        let num_samples = buffers[..channels]
            .iter()
            .map(|buffer| buffer.len())
            .fold(num_samples, usize::min);
        if channels == 0 || num_samples == 0 {
            return;
        }

        self.read_bypass(changes);

        let mut start = 0;
        while start < num_samples {
            let end = start + (num_samples - start).min(self.setup.max_block_size);
            self.prepare_block(start, end, num_samples, changes);

            if !self.bypassed {
                for (channel, buffer) in self.channels[..channels].iter_mut().zip(buffers.iter_mut()) {
                    channel.process_in_place(&mut buffer[start..end], &self.params);
                }
            }

            start = end;
        }
    }

    fn read_bypass(&mut self, changes: &[ParamChanges]) {
        for change in changes.iter().filter(|change| change.id == ParamId::Bypass) {
            if let Some(value) = change.last_value() {
                self.bypassed = value > 0.5;
            }
        }
    }

    /// Pre-fill, apply the automation that falls in `start..end`, smooth.
    fn prepare_block(&mut self, start: usize, end: usize, total: usize, changes: &[ParamChanges]) {
        self.params.begin_block(end - start);

        for change in changes.iter().filter(|change| change.id != ParamId::Bypass) {
            let points = change.points;
            let lo = points.partition_point(|point| point.offset < start);
            // Offsets past the end of the block belong to the final sub-block
            let hi = if end >= total {
                points.len()
            } else {
                points.partition_point(|point| point.offset < end)
            };

            if lo < hi {
                self.params.apply_changes(change.id, &points[lo..hi], start);
            }
        }

        self.params.smooth_all();
    }

    /// Apply one control message. Realtime-safe.
    pub fn handle_message(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::SetParam {
                id: ParamId::Bypass,
                value,
            } => self.bypassed = value > 0.5,
            ControlMessage::SetParam { id, value } => {
                if let Some(unit) = self.params.get_mut(id) {
                    unit.set(value);
                }
            }
            ControlMessage::SetBypass(bypassed) => self.bypassed = bypassed,
            ControlMessage::Reset => self.reset(),
        }
    }

    /// Apply every pending control message.
    pub fn drain_messages<R: ControlReceiver>(&mut self, receiver: &mut R) {
        while let Some(message) = receiver.pop() {
            self.handle_message(message);
        }
    }

    /// Clear filter and feedback memory in every channel.
    pub fn reset(&mut self) {
        for channel in self.channels.iter_mut() {
            channel.reset();
        }
    }

    /// Snapshot the last explicit value of every control.
    pub fn state(&self) -> PersistedState {
        PersistedState {
            depth: self.params.depth.last_value() as f64,
            center: self.params.center.last_value() as f64,
            note: self.params.note.last_value() as f64,
            focus: self.params.focus.last_value() as f64,
            center_type: self.params.center_type.last_value() as f64,
            note_offset: self.params.note_offset.last_value() as f64,
            bypass: if self.bypassed { 1.0 } else { 0.0 },
            feedback: self.params.feedback.last_value() as f64,
        }
    }

    /// Restore a snapshot taken with [`state`](Self::state).
    pub fn set_state(&mut self, state: &PersistedState) -> Result<(), StateError> {
        state.validate()?;

        for unit in self.params.iter_mut() {
            unit.fill_with(state.value(unit.id()) as f32);
        }
        self.bypassed = state.is_bypassed();

        debug!(?state, "restored parameter state");
        Ok(())
    }

    /// Restore from the binary persisted form.
    pub fn load_state(&mut self, bytes: &[u8]) -> Result<(), StateError> {
        let state = PersistedState::from_bytes(bytes).inspect_err(|err| {
            debug!(%err, "failed to decode parameter state");
        })?;
        self.set_state(&state)
    }
}
