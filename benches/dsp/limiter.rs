//! Benchmarks for the safety limiter.

use std::hint::black_box;

use circulate_dsp::dsp::limiter::limit_buffer;
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_limiter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/limiter");

    for &size in BLOCK_SIZES {
        // Mostly below threshold
        let quiet: Vec<f32> = (0..size).map(|i| 0.5 * (i as f32 * 0.1).sin()).collect();
        let mut buffer = quiet.clone();
        group.bench_with_input(BenchmarkId::new("linear", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&quiet);
                limit_buffer(black_box(&mut buffer));
            })
        });

        // Every sample in the tanh knee
        let hot: Vec<f32> = (0..size).map(|i| 3.0 * (i as f32 * 0.1).sin()).collect();
        let mut buffer = hot.clone();
        group.bench_with_input(BenchmarkId::new("saturating", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&hot);
                limit_buffer(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
