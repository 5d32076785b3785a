//! Benchmarks for the complete circulate effect.

use std::hint::black_box;

use circulate_dsp::{AutomationPoint, CirculateProcessor, ParamChanges, ParamId, ProcessSetup};
use criterion::{BenchmarkId, Criterion};

use crate::{ramp, BLOCK_SIZES};

fn processor(size: usize, depth: f32, feedback: f32) -> CirculateProcessor {
    let mut processor =
        CirculateProcessor::new(ProcessSetup::new(48_000, size)).expect("valid bench setup");
    if let Some(unit) = processor.params_mut().get_mut(ParamId::Depth) {
        unit.set(depth);
    }
    if let Some(unit) = processor.params_mut().get_mut(ParamId::Feedback) {
        unit.set(feedback);
    }
    processor
}

pub fn bench_effect(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/effect");

    for &size in BLOCK_SIZES {
        let input = ramp(size);
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        // === MONO: 16 stages, no feedback ===
        let mut mono = processor(size, 0.25, 0.5);
        mono.set_channel_layout(1, 1).expect("mono layout");
        group.bench_with_input(BenchmarkId::new("mono_16", size), &size, |b, &n| {
            b.iter(|| {
                mono.process(n, &[black_box(input.as_slice())], &mut [&mut left], &[]);
            })
        });

        // === STEREO: all 64 stages with heavy feedback ===
        let mut stereo = processor(size, 1.0, 0.95);
        group.bench_with_input(BenchmarkId::new("stereo_64", size), &size, |b, &n| {
            b.iter(|| {
                stereo.process(
                    n,
                    &[black_box(input.as_slice()), black_box(input.as_slice())],
                    &mut [&mut left, &mut right],
                    &[],
                );
            })
        });

        // === AUTOMATED: centre sweep and depth steps every block ===
        let center: Vec<AutomationPoint> = (0..size)
            .step_by(16)
            .map(|offset| AutomationPoint::new(offset, offset as f32 / size as f32))
            .collect();
        let depth = [AutomationPoint::new(0, 0.5), AutomationPoint::new(size / 2, 0.75)];
        let changes = [
            ParamChanges::new(ParamId::Center, &center),
            ParamChanges::new(ParamId::Depth, &depth),
        ];
        let mut automated = processor(size, 0.5, 0.7);
        group.bench_with_input(BenchmarkId::new("stereo_automated", size), &size, |b, &n| {
            b.iter(|| {
                automated.process(
                    n,
                    &[&input, &input],
                    &mut [&mut left, &mut right],
                    black_box(&changes[..]),
                );
            })
        });
    }

    group.finish();
}
