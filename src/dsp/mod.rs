//! Low-level DSP primitives used by the circulate effect.
//!
//! These components are allocation-free and realtime-safe. They stay
//! focused on the signal-processing math; the `effect` module layers
//! parameter handling and per-sample orchestration on top.

/// Second-order TPT allpass stage and its shared coefficient state.
pub mod allpass;
/// Fixed-capacity series cascade of allpass stages.
pub mod cascade;
/// Note, log-range and Nyquist-ceiling frequency helpers.
pub mod frequency;
/// Linear-then-tanh safety limiter.
pub mod limiter;
/// One-pole smoother for auxiliary control signals.
pub mod smoother;

pub use allpass::{AllpassStage, CoefficientState};
pub use cascade::AllpassCascade;
pub use smoother::ValueSmoother;
