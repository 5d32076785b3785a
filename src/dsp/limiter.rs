//! Safety limiter
//!
//! A limiter that is completely linear up to a threshold and follows a tanh
//! knee above it. The circulate effect runs it twice per sample: on the
//! feedback sample before it is reinjected, and on the cascade output.
//!
//! # Transfer Curve
//!
//! ```text
//!   out
//!   1.0 ┤                 ___________
//!  0.99 ┤               ╱
//!       │             ╱
//!       │           ╱      linear region: out = in
//!       │         ╱
//!   0.0 ┼───────╱──────────────────── in
//!              0.99    tanh knee above threshold
//! ```
//!
//! Above the threshold `T` the excess is normalised by the headroom `1 - T`
//! and squashed:
//!
//! ```text
//! w   = (x - T) / (1 - T)
//! out = T + tanh(w) * (1 - T)
//! ```
//!
//! Since `tanh(w) < 1` the output never leaves `[-1, 1]`, and the curve
//! meets the linear region with matching slope at the threshold, so a signal
//! that brushes the threshold is bent rather than clipped.

/// Default limiter threshold.
pub const DEFAULT_THRESHOLD: f32 = 0.99;

/// Limit a sample with the default threshold.
#[inline]
pub fn limit(x: f32) -> f32 {
    limit_with_threshold(x, DEFAULT_THRESHOLD)
}

/// Limit a sample: linear inside `[-threshold, threshold]`, tanh knee outside.
///
/// `threshold` must be in `(0, 1)`.
#[inline]
pub fn limit_with_threshold(x: f32, threshold: f32) -> f32 {
    let headroom = 1.0 - threshold;

    if x > threshold {
        let w = (x - threshold) / headroom;
        return threshold + w.tanh() * headroom;
    }

    if x < -threshold {
        let w = (-x - threshold) / headroom;
        return -threshold - w.tanh() * headroom;
    }

    x
}

/// Apply the default limiter to an entire buffer in place.
pub fn limit_buffer(buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        *sample = limit(*sample);
    }
}
