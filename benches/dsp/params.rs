//! Benchmarks for the per-block parameter pipeline (pre-fill, automation,
//! smoothing).

use std::hint::black_box;

use circulate_dsp::{AudioEffectParameters, AutomationPoint, ParamId, ProcessSetup};
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_params(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/params");

    for &size in BLOCK_SIZES {
        let setup = ProcessSetup::new(48_000, size);

        // No automation: pre-fill and smoothing only
        let mut params = AudioEffectParameters::new(&setup);
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, &n| {
            b.iter(|| {
                params.begin_block(black_box(n));
                params.smooth_all();
            })
        });

        // Dense automation on every smoothed control
        let points: Vec<AutomationPoint> = (0..size)
            .step_by(8)
            .map(|offset| AutomationPoint::new(offset, (offset % 64) as f32 / 64.0))
            .collect();
        let mut params = AudioEffectParameters::new(&setup);
        group.bench_with_input(BenchmarkId::new("automated", size), &size, |b, &n| {
            b.iter(|| {
                params.begin_block(n);
                for id in [ParamId::Center, ParamId::Focus, ParamId::NoteOffset, ParamId::Feedback] {
                    params.apply_changes(id, black_box(&points), 0);
                }
                params.smooth_all();
            })
        });
    }

    group.finish();
}
