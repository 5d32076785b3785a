//! Benchmarks for low-level DSP primitives.

mod allpass;
mod limiter;
mod params;

pub use allpass::bench_allpass;
pub use limiter::bench_limiter;
pub use params::bench_params;
