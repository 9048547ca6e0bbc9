//! Sign-aware trapezoidal integration of the error signal.

/// Signed area under the linearly interpolated error curve over one control
/// interval of `dt` seconds.
///
/// When both endpoint errors share a sign the trapezoid area is accumulated
/// directly. When the sign flips inside the interval, the zero crossing is
/// located by linear interpolation and the two triangular sub-areas are
/// summed, so areas on either side of the crossing cancel by exactly their
/// signed magnitudes instead of being averaged away.
///
/// The crossing branch divides by `dt` with no guard. Under IEEE semantics a
/// zero-`dt` crossing still collapses to zero area (infinite slope, zero
/// crossing time), but a non-finite endpoint error propagates NaN into
/// whatever accumulator receives this value, where it persists. Both
/// observed behaviors are pinned by tests below rather than "fixed".
pub fn signed_trapezoid_area(error_prev: f64, error: f64, dt: f64) -> f64 {
    if error >= 0.0 && error_prev >= 0.0 {
        let large = error.max(error_prev);
        let small = error.min(error_prev);
        small * dt + 0.5 * (large - small) * dt
    } else if error <= 0.0 && error_prev <= 0.0 {
        let large = error.min(error_prev);
        let small = error.max(error_prev);
        small * dt + 0.5 * (large - small) * dt
    } else {
        let slope = (error - error_prev) / dt;
        let time_to_zero = -error_prev / slope;
        0.5 * error_prev * time_to_zero + 0.5 * error * (dt - time_to_zero)
    }
}
