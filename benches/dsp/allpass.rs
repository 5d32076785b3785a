//! Benchmarks for the allpass stage and cascade.

use std::hint::black_box;

use circulate_dsp::dsp::{AllpassCascade, AllpassStage, CoefficientState};
use criterion::{BenchmarkId, Criterion};

use crate::{ramp, BLOCK_SIZES};

pub fn bench_allpass(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/allpass");

    for &size in BLOCK_SIZES {
        let input = ramp(size);

        // Single stage, fixed coefficients
        let mut coefficients = CoefficientState::new();
        coefficients.snap_to(1000.0, 0.5, 48_000);
        let mut stage = AllpassStage::new();
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("stage", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                stage.render(black_box(&mut buffer), black_box(&coefficients));
            })
        });

        // Coefficient smoothing on every sample (sweeping centre)
        let mut coefficients = CoefficientState::new();
        coefficients.set_smooth_time(5.0, 48_000);
        group.bench_with_input(BenchmarkId::new("coefficients", size), &size, |b, &n| {
            b.iter(|| {
                for i in 0..n {
                    let freq = 200.0 + 10.0 * i as f64;
                    coefficients.update(black_box(freq), black_box(0.3), 48_000);
                }
            })
        });

        // Full cascade at a few depths
        for &stages in &[8usize, 32, 64] {
            let mut cascade = AllpassCascade::new();
            cascade.set_smooth_time(5.0, 48_000);
            cascade.update_coefficients(1000.0, 0.5, 48_000);
            let mut buffer = input.clone();
            group.bench_with_input(
                BenchmarkId::new(format!("cascade_{stages}"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        buffer.copy_from_slice(&input);
                        for sample in buffer.iter_mut() {
                            *sample = cascade.process(black_box(*sample), stages);
                        }
                    })
                },
            );
        }
    }

    group.finish();
}
