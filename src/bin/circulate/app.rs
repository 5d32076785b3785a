//! Circulate - application builder and audio runner

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{error, info};

use circulate_dsp::{CirculateProcessor, ControlMessage, ProcessSetup, MAX_BLOCK_SIZE};

use super::source::{SourceKind, TestSource};
use super::ui::{EffectStatus, UiApp, UiInit};

/// Room for a burst of knob turns between two audio callbacks
const CONTROL_QUEUE_SIZE: usize = 256;
/// About a second of visualisation samples at 48 kHz
const AUDIO_QUEUE_SIZE: usize = 48_000;
const STATUS_QUEUE_SIZE: usize = 16;

/// Main application builder
pub struct Circulate {
    source: SourceKind,
}

impl Circulate {
    pub fn new() -> Self {
        Self {
            source: SourceKind::Saw,
        }
    }

    /// Choose the test signal fed into the effect
    pub fn source(mut self, source: SourceKind) -> Self {
        self.source = source;
        self
    }

    /// Open the default output device, start the stream and hand the
    /// terminal to the UI until it quits.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;
        info!(sample_rate, channels, source = self.source.name(), "opening output stream");

        let mut processor = CirculateProcessor::new(ProcessSetup::new(sample_rate, MAX_BLOCK_SIZE))
            .wrap_err("failed to create the effect")?;
        let effect_channels = channels.min(2);
        processor
            .set_channel_layout(effect_channels, effect_channels)
            .wrap_err("unsupported output channel count")?;

        let (control_tx, control_rx) = RingBuffer::<ControlMessage>::new(CONTROL_QUEUE_SIZE);
        let (audio_tx, audio_rx) = RingBuffer::<f32>::new(AUDIO_QUEUE_SIZE);
        let (status_tx, status_rx) = RingBuffer::<EffectStatus>::new(STATUS_QUEUE_SIZE);

        let init = UiInit::new(sample_rate, self.source, processor.state());

        let mut audio = AudioState {
            processor,
            source: TestSource::new(self.source, sample_rate as f32),
            control_rx,
            audio_tx,
            status_tx,
            input: vec![0.0; MAX_BLOCK_SIZE],
            left: vec![0.0; MAX_BLOCK_SIZE],
            right: vec![0.0; MAX_BLOCK_SIZE],
        };

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| audio.render(data, channels),
            |err| error!(%err, "audio stream error"),
            None,
        )?;
        stream.play()?;

        let mut terminal = ratatui::init();
        let result = UiApp::new(control_tx, audio_rx, status_rx, init).run(&mut terminal);
        ratatui::restore();

        info!("shutting down");
        result
    }
}

impl Default for Circulate {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the audio callback owns
struct AudioState {
    processor: CirculateProcessor,
    source: TestSource,
    control_rx: Consumer<ControlMessage>,
    audio_tx: Producer<f32>,
    status_tx: Producer<EffectStatus>,
    input: Vec<f32>,
    left: Vec<f32>,
    right: Vec<f32>,
}

impl AudioState {
    fn render(&mut self, data: &mut [f32], channels: usize) {
        self.processor.drain_messages(&mut self.control_rx);

        let total_frames = data.len() / channels;
        let mut frames_written = 0;

        while frames_written < total_frames {
            let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);

            self.source.render(&mut self.input[..frames]);
            let input = &self.input[..frames];

            let left = &mut self.left[..frames];
            let right = &mut self.right[..frames];
            if channels == 1 {
                self.processor.process(frames, &[input], &mut [left], &[]);
            } else {
                self.processor
                    .process(frames, &[input, input], &mut [left, right], &[]);
            }

            // Interleave; extra device channels get the left signal
            let out_off = frames_written * channels;
            for i in 0..frames {
                let frame = &mut data[out_off + i * channels..out_off + (i + 1) * channels];
                for (ch, out) in frame.iter_mut().enumerate() {
                    *out = if ch == 1 { self.right[i] } else { self.left[i] };
                }
                // Drop visualisation samples when the UI falls behind
                let _ = self.audio_tx.push(self.left[i]);
            }

            frames_written += frames;
        }

        let channel = self.processor.channel(0);
        let _ = self.status_tx.push(EffectStatus {
            center_hz: channel.map_or(0.0, |c| c.center_hz()),
            active_stages: channel.map_or(0, |c| c.active_stages()),
            bypassed: self.processor.is_bypassed(),
        });
    }
}
