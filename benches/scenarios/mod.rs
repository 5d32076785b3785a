//! Real-world scenario benchmarks.
//!
//! The whole effect driven the way a host drives it: one call per block,
//! with or without automation.

mod effect;

pub use effect::bench_effect;
