//! Offline render of an automated circulate sweep to a WAV file.
//!
//! A sawtooth runs through the effect while the centre frequency sweeps up
//! and back down, with the stage count stepping up every second. Automation
//! is sent the way a host sends it: a few sparse points per block.
//!
//! Run with: cargo run --example offline_render [output.wav]

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use hound::{SampleFormat, WavSpec, WavWriter};

use circulate_dsp::{AutomationPoint, CirculateProcessor, ParamChanges, ParamId, ProcessSetup};

const SAMPLE_RATE: u32 = 48_000;
const BLOCK_SIZE: usize = 512;
const SECONDS: usize = 8;
const SAW_HZ: f32 = 82.41;

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "circulate_sweep.wav".to_string());

    let mut processor = CirculateProcessor::new(ProcessSetup::new(SAMPLE_RATE, BLOCK_SIZE))?;

    let spec = WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer =
        WavWriter::create(&path, spec).wrap_err_with(|| format!("failed to create {path}"))?;

    let total = SAMPLE_RATE as usize * SECONDS;
    let mut phase = 0.0f32;
    let mut input = vec![0.0f32; BLOCK_SIZE];
    let mut left = vec![0.0f32; BLOCK_SIZE];
    let mut right = vec![0.0f32; BLOCK_SIZE];

    // Fixed settings, sent once on the first block
    let feedback = [AutomationPoint::new(0, 0.85)];
    let focus = [AutomationPoint::new(0, 0.6)];

    let mut rendered = 0;
    while rendered < total {
        let frames = BLOCK_SIZE.min(total - rendered);

        for sample in input[..frames].iter_mut() {
            *sample = 0.4 * (2.0 * phase - 1.0);
            phase = (phase + SAW_HZ / SAMPLE_RATE as f32).fract();
        }

        // Triangle sweep over the whole render, one point every 128 samples
        let center: Vec<AutomationPoint> = (0..frames)
            .step_by(128)
            .map(|offset| {
                let t = (rendered + offset) as f32 / total as f32;
                AutomationPoint::new(offset, 1.0 - (2.0 * t - 1.0).abs())
            })
            .collect();

        // Stage count steps up once a second
        let second = rendered / SAMPLE_RATE as usize;
        let depth = [AutomationPoint::new(0, (second + 1) as f32 / SECONDS as f32)];

        let mut changes = vec![
            ParamChanges::new(ParamId::Center, &center),
            ParamChanges::new(ParamId::Depth, &depth),
        ];
        if rendered == 0 {
            changes.push(ParamChanges::new(ParamId::Feedback, &feedback));
            changes.push(ParamChanges::new(ParamId::Focus, &focus));
        }

        processor.process(
            frames,
            &[&input[..frames], &input[..frames]],
            &mut [&mut left[..frames], &mut right[..frames]],
            &changes,
        );

        for (&l, &r) in left[..frames].iter().zip(&right[..frames]) {
            writer.write_sample(l)?;
            writer.write_sample(r)?;
        }

        rendered += frames;
    }

    writer.finalize()?;

    let state = processor.state();
    println!("Rendered {} s to {}", SECONDS, path);
    println!(
        "Final depth {:.2}, {} stages at {:.0} Hz",
        state.depth,
        processor.channel(0).map_or(0, |c| c.active_stages()),
        processor.channel(0).map_or(0.0, |c| c.center_hz()),
    );
    Ok(())
}
